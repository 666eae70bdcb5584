// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Resource Coordination (§2 stage 1): accepts an application input
//! buffer, acquires a PPCS from its pool, and pairs it with the SCS and the
//! input-picture descriptor.

use crate::data_model::ppcs::{ParentPictureControlSet, SliceType};
use crate::data_model::scs::SequenceControlSet;
use crate::picture::{FrameMetadata, InputPixelStorage};
use crate::pipeline::pool::{Pool, PooledGuard};

/// One application-submitted picture, still untyped with respect to slice
/// type (Picture Decision assigns that later).
pub struct IncomingPicture {
    pub meta: FrameMetadata,
    pub buffer: InputPixelStorage,
}

/// Acquires a PPCS from `pool`, resets it for `incoming`, and returns it to
/// be posted onto the Picture-Analysis fifo. The PPCS's slice type is a
/// provisional `P`; Picture Decision is the authority that finalizes it.
pub fn coordinate(
    pool: &Pool<ParentPictureControlSet>,
    scs: &SequenceControlSet,
    incoming: IncomingPicture,
) -> (PooledGuard<ParentPictureControlSet>, InputPixelStorage) {
    let mut ppcs = pool.acquire();
    *ppcs = ParentPictureControlSet::new(incoming.meta, scs.resolution, scs.sb_grid.clone(), SliceType::P);
    ppcs.frame_header.base_q_idx = 0;
    (ppcs, incoming.buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderConfig;
    use crate::data_model::ppcs::ParentPictureControlSet;
    use crate::data_model::sb::{SbGrid, SB_SIZE_LARGE};

    fn test_pool(scs: &SequenceControlSet) -> Pool<ParentPictureControlSet> {
        let sb_grid = scs.sb_grid.clone();
        let resolution = scs.resolution;
        Pool::new("ppcs", 4, move |_| {
            Ok(ParentPictureControlSet::new(
                FrameMetadata { picture_number: 0, timestamp: 0, force_keyframe: false },
                resolution,
                sb_grid.clone(),
                SliceType::P,
            ))
        })
        .unwrap()
    }

    #[test]
    fn coordinate_stamps_incoming_metadata_onto_a_fresh_ppcs() {
        let config = EncoderConfig::default();
        let scs = SequenceControlSet::from_config(&config, 4);
        let pool = test_pool(&scs);

        let incoming = IncomingPicture {
            meta: FrameMetadata { picture_number: 7, timestamp: 1000, force_keyframe: false },
            buffer: InputPixelStorage::Eight {
                planes: [vec![0; 16], vec![0; 4], vec![0; 4]],
            },
        };

        let (ppcs, _buffer) = coordinate(&pool, &scs, incoming);
        assert_eq!(ppcs.meta.picture_number, 7);
        assert_eq!(ppcs.resolution, scs.resolution);
    }

    #[test]
    fn pool_slot_is_reused_not_leaked() {
        let config = EncoderConfig::default();
        let scs = SequenceControlSet::from_config(&config, 4);
        let pool = test_pool(&scs);
        assert_eq!(pool.capacity(), 4);

        for i in 0..4 {
            let incoming = IncomingPicture {
                meta: FrameMetadata { picture_number: i, timestamp: 0, force_keyframe: false },
                buffer: InputPixelStorage::Eight { planes: [vec![], vec![], vec![]] },
            };
            let (ppcs, _buffer) = coordinate(&pool, &scs, incoming);
            drop(ppcs);
        }
        assert!(pool.try_acquire().is_some());
    }
}
