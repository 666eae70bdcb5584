// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Pipeline orchestrator (§4.1, §5): wires the pools and stage-to-stage
//! fifos, spawns one worker-loop thread per stage, and drains end-of-stream
//! through the whole chain. Grounded in `EbEncHandle.c`'s shape: pool
//! capacity derivation (from `SequenceControlSet::pool_capacities`) and the
//! EOS propagation chain are pipeline-wide concerns owned here, not by any
//! individual stage.
//!
//! Each stage below runs exactly one worker thread. A production encoder
//! fans multiple workers out per stage and reorders their completions back
//! into picture-number order with a broadcast-EOS/reorder scheme; that
//! scheme is a threading-primitive choice this spec leaves unconstrained
//! (§1 Non-goals), so it is not built here. `worker_count` still governs
//! fifo/pool capacity sizing via [`crate::data_model::scs::PoolCapacities`].

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::EncoderConfig;
use crate::data_model::ppcs::{ParentPictureControlSet, SliceType};
use crate::data_model::reference::ReferenceObject;
use crate::data_model::scs::SequenceControlSet;
use crate::error::{PipelineError, PipelineResult, PoolResult};
use crate::mdc::frame_context::FrameContext;
use crate::picture::{FrameMetadata, InputPixelStorage};
use crate::pipeline::fifo::{bounded_fifo, FifoReceiver, FifoSender, Message};
use crate::pipeline::pool::Pool;
use crate::pipeline::segmentation::PictureBarrier;
use crate::pipeline::stage::run_worker;
use crate::pipeline::stages::initial_rate_control::{accumulate, LookaheadAggregate};
use crate::pipeline::stages::mode_decision_configuration::{configure, MdcPictureInputs};
use crate::pipeline::stages::motion_estimation::{complete_sb, estimate_sb, ReferencePlane};
use crate::pipeline::stages::picture_analysis::analyze;
use crate::pipeline::stages::picture_decision::decide;
use crate::pipeline::stages::picture_manager::PictureManager;
use crate::pipeline::stages::resource_coordination::{coordinate, IncomingPicture};
use crate::pipeline::stages::source_based_operations::{propagate, TplBlockCost};
use crate::me::task::MeTaskKind;

/// One picture in flight between stages: the PPCS plus the still-needed
/// input pixel buffer (later stages only read the luma plane; chroma
/// rides along for the out-of-scope EncDec pass this pipeline feeds).
pub struct PictureItem {
    pub ppcs: Box<ParentPictureControlSet>,
    pub buffer: InputPixelStorage,
}

pub const FLAG_EOS: u32 = 1;
pub const FLAG_FATAL: u32 = 2;

/// A completed picture's exit-code packet (§6). The coded payload itself
/// is produced by the out-of-scope entropy coder and packetizer (§1
/// Non-goals: AV1 syntax-element bit packing); `flags` carries the same
/// 0 / EOS / fatal semantics a real bitstream packet would.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputPacket {
    pub picture_number: u64,
    pub flags: u32,
}

/// Extracts an 8-bit luma plane from any of the three input pixel-storage
/// modes (§6), downconverting 10-bit content by dropping to the top 8
/// bits — exact 10-bit preservation end-to-end belongs to the out-of-scope
/// bit-packing stage (§1 Non-goals), so every stage here operates on this
/// one normalized 8-bit view.
fn extract_luma(buffer: &InputPixelStorage) -> Vec<u8> {
    match buffer {
        InputPixelStorage::Eight { planes } => planes[0].clone(),
        InputPixelStorage::TenCompressed { planes, .. } => planes[0].clone(),
        InputPixelStorage::TenUnpacked { planes } => planes[0].iter().map(|&s| (s >> 2) as u8).collect(),
    }
}

/// One entry of the simplified reconstructed-reference store: ME searches
/// against the *source* luma of already-processed pictures as a stand-in
/// for the true post-filter reconstructed plane, since reconstruction
/// (DLF/CDEF/restoration/EncDec) is external to this spec (§1). This only
/// affects what pixels ME matches against; the ME/MDC algorithms
/// themselves are exercised exactly as specified.
#[derive(Clone)]
struct ReconSlot {
    picture_number: u64,
    luma: Vec<u8>,
    width: u32,
    height: u32,
}

/// Session-wide mutable state a handful of stages fold into, bundled so
/// the orchestrator hands one `Arc` to every stage closure that needs it
/// rather than threading several separate locks through each thread.
struct SharedState {
    lookahead: Mutex<LookaheadAggregate>,
    picture_manager: Mutex<PictureManager>,
    recon_dpb: Mutex<Vec<ReconSlot>>,
    reference_contexts: Mutex<Vec<FrameContext>>,
    decoded_reference_cap: usize,
}

/// Owns every stage thread and the fifos/pools connecting them. Dropping
/// an orchestrator without calling [`PipelineOrchestrator::signal_eos`] and
/// [`PipelineOrchestrator::join`] leaves its threads blocked on their input
/// fifos; callers (§6 `enc_deinit`) must signal EOS and join before tearing
/// down.
pub struct PipelineOrchestrator {
    scs: SequenceControlSet,
    ppcs_pool: Arc<Pool<ParentPictureControlSet>>,
    shared: Arc<SharedState>,

    input_tx: FifoSender<IncomingPicture>,
    output_rx: FifoReceiver<OutputPacket>,

    handles: Vec<JoinHandle<PipelineResult<()>>>,
}

/// A decoded picture's reconstructed luma plane (§6 optional `get_recon`).
/// Populated only when [`EncoderConfig::recon_enabled`] is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconPicture {
    pub picture_number: u64,
    pub luma: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PipelineOrchestrator {
    /// Builds every pool and fifo and spawns one thread per stage. Pool
    /// allocation failure is reported synchronously (§7 Insufficient
    /// resources), matching `enc_init`'s contract.
    pub fn new(config: &EncoderConfig, worker_count: usize) -> PoolResult<Self> {
        let worker_count = worker_count.max(1);
        let scs = SequenceControlSet::from_config(config, worker_count);
        let caps = scs.pool_capacities;

        let sb_grid_for_pool = scs.sb_grid.clone();
        let resolution = scs.resolution;
        let ppcs_pool = Arc::new(Pool::new("ppcs", caps.ppcs, move |_| {
            Ok(ParentPictureControlSet::new(
                FrameMetadata { picture_number: 0, timestamp: 0, force_keyframe: false },
                resolution,
                sb_grid_for_pool.clone(),
                SliceType::P,
            ))
        })?);

        let shared = Arc::new(SharedState {
            lookahead: Mutex::new(LookaheadAggregate::default()),
            picture_manager: Mutex::new(PictureManager::new(scs.decode_order_enforced)),
            recon_dpb: Mutex::new(Vec::new()),
            reference_contexts: Mutex::new(Vec::new()),
            decoded_reference_cap: caps.decoded_references,
        });

        let (input_tx, input_rx) = bounded_fifo::<IncomingPicture>(caps.input_buffers);
        let (pa_tx, pa_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (pd_tx, pd_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (me_tx, me_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (irc_tx, irc_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (sbo_tx, sbo_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (pm_tx, pm_rx) = bounded_fifo::<PictureItem>(caps.ppcs);
        let (output_tx, output_rx) = bounded_fifo::<OutputPacket>(caps.output_stream_buffers);

        let mut handles = Vec::new();

        handles.push(Self::spawn_resource_coordination(input_rx, pa_tx, ppcs_pool.clone(), scs.clone()));
        handles.push(Self::spawn_picture_analysis(pa_rx, pd_tx));
        handles.push(Self::spawn_picture_decision(pd_rx, me_tx, scs.mini_gop_size));
        handles.push(Self::spawn_motion_estimation(me_rx, irc_tx, shared.clone(), config.enc_mode));
        handles.push(Self::spawn_initial_rate_control(irc_rx, sbo_tx, shared.clone()));
        handles.push(Self::spawn_source_based_operations(sbo_rx, pm_tx));
        handles.push(Self::spawn_picture_manager(pm_rx, output_tx, shared.clone(), ppcs_pool.clone(), config.clone()));

        Ok(Self { scs, ppcs_pool, shared, input_tx, output_rx, handles })
    }

    fn spawn_resource_coordination(
        input_rx: FifoReceiver<IncomingPicture>,
        pa_tx: FifoSender<PictureItem>,
        pool: Arc<Pool<ParentPictureControlSet>>,
        scs: SequenceControlSet,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            run_worker("resource_coordination", &input_rx, &pa_tx, |incoming| {
                let (ppcs, buffer) = coordinate(&pool, &scs, incoming);
                Ok(PictureItem { ppcs: Box::new(ppcs.into_inner()), buffer })
            })
        })
    }

    fn spawn_picture_analysis(
        pa_rx: FifoReceiver<PictureItem>,
        pd_tx: FifoSender<PictureItem>,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            run_worker("picture_analysis", &pa_rx, &pd_tx, |item: PictureItem| {
                let luma = extract_luma(&item.buffer);
                let _stats = analyze(&luma);
                Ok(item)
            })
        })
    }

    fn spawn_picture_decision(
        pd_rx: FifoReceiver<PictureItem>,
        me_tx: FifoSender<PictureItem>,
        mini_gop_size: u32,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            let mut position_in_gop = 0u32;
            let mut decode_order = 0u64;
            let mut is_stream_start = true;
            run_worker("picture_decision", &pd_rx, &me_tx, move |mut item: PictureItem| {
                decide(&mut item.ppcs, position_in_gop, mini_gop_size, decode_order, is_stream_start);
                is_stream_start = false;
                decode_order += 1;
                position_in_gop = (position_in_gop + 1) % mini_gop_size.max(1);
                Ok(item)
            })
        })
    }

    fn spawn_motion_estimation(
        me_rx: FifoReceiver<PictureItem>,
        irc_tx: FifoSender<PictureItem>,
        shared: Arc<SharedState>,
        enc_mode: u8,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            run_worker("motion_estimation", &me_rx, &irc_tx, move |mut item: PictureItem| {
                let luma = extract_luma(&item.buffer);
                let width = item.ppcs.resolution.width as usize;
                let height = item.ppcs.resolution.height as usize;

                let references = {
                    let dpb = shared.recon_dpb.lock().expect("recon dpb poisoned");
                    dpb.iter()
                        .map(|slot| ReferencePlane {
                            samples: slot.luma.as_slice(),
                            stride: slot.width as usize,
                            width: slot.width as i32,
                            height: slot.height as i32,
                        })
                        .collect::<Vec<_>>()
                };

                let result = estimate_sb(
                    MeTaskKind::PictureMe,
                    &luma,
                    width,
                    width,
                    height,
                    &references,
                    enc_mode,
                    item.ppcs.resolution.luma_samples(),
                );
                let is_bipred = matches!(item.ppcs.slice_type, crate::data_model::ppcs::SliceType::B);
                complete_sb(&mut item.ppcs, 0, result, is_bipred);

                {
                    let mut dpb = shared.recon_dpb.lock().expect("recon dpb poisoned");
                    dpb.push(ReconSlot {
                        picture_number: item.ppcs.meta.picture_number,
                        luma,
                        width: width as u32,
                        height: height as u32,
                    });
                    while dpb.len() > shared.decoded_reference_cap.max(1) {
                        dpb.remove(0);
                    }
                }

                Ok(item)
            })
        })
    }

    fn spawn_initial_rate_control(
        irc_rx: FifoReceiver<PictureItem>,
        sbo_tx: FifoSender<PictureItem>,
        shared: Arc<SharedState>,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            run_worker("initial_rate_control", &irc_rx, &sbo_tx, move |item: PictureItem| {
                let luma = extract_luma(&item.buffer);
                let stats = analyze(&luma);
                let mut aggregate = shared.lookahead.lock().expect("lookahead aggregate poisoned");
                accumulate(&mut aggregate, &stats);
                Ok(item)
            })
        })
    }

    fn spawn_source_based_operations(
        sbo_rx: FifoReceiver<PictureItem>,
        pm_tx: FifoSender<PictureItem>,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || {
            run_worker("source_based_operations", &sbo_rx, &pm_tx, |mut item: PictureItem| {
                let sb_count = item.ppcs.sb_total_count.max(1);
                let costs = vec![TplBlockCost::default(); sb_count];
                let barrier = PictureBarrier::new(1);
                propagate(&mut item.ppcs, &costs, &barrier);
                Ok(item)
            })
        })
    }

    fn spawn_picture_manager(
        pm_rx: FifoReceiver<PictureItem>,
        output_tx: FifoSender<OutputPacket>,
        shared: Arc<SharedState>,
        ppcs_pool: Arc<Pool<ParentPictureControlSet>>,
        config: EncoderConfig,
    ) -> JoinHandle<PipelineResult<()>> {
        std::thread::spawn(move || loop {
            match pm_rx.recv()? {
                Some(Message::Item(item)) => {
                    let mut manager = shared.picture_manager.lock().expect("picture manager poisoned");
                    let ready = manager.admit(item.ppcs);
                    drop(manager);

                    for mut ppcs in ready {
                        let reference_contexts = shared.reference_contexts.lock().expect("reference contexts poisoned");
                        let inputs = MdcPictureInputs {
                            reference_contexts: &reference_contexts[..],
                            base_q_idx: config.qp,
                            screen_content_mode: config.screen_content_mode,
                            superres_active: config.superres_mode != crate::config::SuperresMode::Off,
                            enc_mode: config.enc_mode,
                            is_first_pass: false,
                        };
                        let mdc_result = configure(&mut ppcs, &inputs);
                        drop(reference_contexts);

                        match mdc_result {
                            Ok(mdc) => {
                                shared
                                    .reference_contexts
                                    .lock()
                                    .expect("reference contexts poisoned")
                                    .push(mdc.frame_context.clone());
                                let _ = ReferenceObject::new(
                                    ppcs.decode_order as u32,
                                    ppcs.frame_type(),
                                    1,
                                    1,
                                );
                                let picture_number = ppcs.meta.picture_number;
                                ppcs_pool.release(*ppcs);
                                output_tx.send(OutputPacket { picture_number, flags: 0 })?;
                            }
                            Err(err) => {
                                log::error!("mode-decision configuration failed fatally for picture {}: {err}", ppcs.meta.picture_number);
                                output_tx.send(OutputPacket { picture_number: ppcs.meta.picture_number, flags: FLAG_FATAL })?;
                                ppcs_pool.release(*ppcs);
                            }
                        }
                    }
                }
                Some(Message::Eos) | None => {
                    output_tx.send_eos()?;
                    return Ok(());
                }
            }
        })
    }

    /// Submits one application input buffer to Resource Coordination.
    pub fn submit(&self, incoming: IncomingPicture) -> PipelineResult<()> {
        self.input_tx.send(incoming)
    }

    /// Signals end-of-stream (§5 Cancellation/timeout): the last input has
    /// already been submitted; this flushes every stage in turn.
    pub fn signal_eos(&self) -> PipelineResult<()> {
        self.input_tx.send_eos()
    }

    /// Non-blocking packet pull (§6 `get_packet`). `Ok(None)` is the
    /// empty-queue case; `Message::Eos` surfaces as the terminal packet.
    pub fn try_recv_output(&self) -> Option<Message<OutputPacket>> {
        self.output_rx.try_recv()
    }

    pub fn sequence_control_set(&self) -> &SequenceControlSet {
        &self.scs
    }

    pub fn ppcs_pool(&self) -> &Pool<ParentPictureControlSet> {
        &self.ppcs_pool
    }

    /// Returns the most recently decoded reference picture's luma, if any
    /// (§6 optional `get_recon`). This is a non-destructive peek: the same
    /// DPB backs motion estimation's reference lookup, so entries are
    /// never removed on this path, only read.
    pub fn take_recon(&self) -> Option<ReconPicture> {
        let dpb = self.shared.recon_dpb.lock().expect("recon dpb poisoned");
        dpb.last().map(|slot| ReconPicture {
            picture_number: slot.picture_number,
            luma: slot.luma.clone(),
            width: slot.width,
            height: slot.height,
        })
    }

    /// Joins every stage thread. Callers must have already signaled EOS;
    /// otherwise this blocks forever on the still-running Resource
    /// Coordination thread.
    pub fn join(self) -> PipelineResult<()> {
        for handle in self.handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => {
                    log::error!("a stage worker thread panicked during join");
                    return Err(PipelineError::WorkerPanicked {
                        stage: "unknown",
                        reason: "thread panicked".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picture::FrameMetadata;

    fn small_config() -> EncoderConfig {
        let mut cfg = EncoderConfig::default();
        cfg.width = 64;
        cfg.height = 64;
        cfg.hierarchical_levels = 1;
        cfg.look_ahead_distance = 2;
        cfg
    }

    #[test]
    fn a_single_picture_drains_through_every_stage_to_an_output_packet() {
        let _ = env_logger::try_init();

        let config = small_config();
        let orchestrator = PipelineOrchestrator::new(&config, 1).unwrap();

        let incoming = IncomingPicture {
            meta: FrameMetadata { picture_number: 0, timestamp: 0, force_keyframe: false },
            buffer: InputPixelStorage::Eight { planes: [vec![16u8; 64 * 64], vec![128u8; 32 * 32], vec![128u8; 32 * 32]] },
        };
        orchestrator.submit(incoming).unwrap();
        orchestrator.signal_eos().unwrap();

        let mut saw_packet = false;
        let mut saw_eos = false;
        loop {
            match orchestrator.try_recv_output() {
                Some(Message::Item(packet)) => {
                    assert_eq!(packet.picture_number, 0);
                    assert_eq!(packet.flags, 0);
                    saw_packet = true;
                }
                Some(Message::Eos) => {
                    saw_eos = true;
                    break;
                }
                None => std::thread::yield_now(),
            }
        }
        assert!(saw_packet);
        assert!(saw_eos);
        orchestrator.join().unwrap();
    }

    #[test]
    fn eos_with_no_pictures_still_drains_to_an_eos_packet() {
        let config = small_config();
        let orchestrator = PipelineOrchestrator::new(&config, 1).unwrap();
        orchestrator.signal_eos().unwrap();

        loop {
            if matches!(orchestrator.try_recv_output(), Some(Message::Eos)) {
                break;
            }
            std::thread::yield_now();
        }
        orchestrator.join().unwrap();
    }

    #[test]
    fn recon_enabled_picture_is_available_through_take_recon() {
        let mut config = small_config();
        config.recon_enabled = true;
        let orchestrator = PipelineOrchestrator::new(&config, 1).unwrap();

        let incoming = IncomingPicture {
            meta: FrameMetadata { picture_number: 0, timestamp: 0, force_keyframe: false },
            buffer: InputPixelStorage::Eight { planes: [vec![16u8; 64 * 64], vec![128u8; 32 * 32], vec![128u8; 32 * 32]] },
        };
        orchestrator.submit(incoming).unwrap();
        orchestrator.signal_eos().unwrap();

        loop {
            if matches!(orchestrator.try_recv_output(), Some(Message::Eos)) {
                break;
            }
            std::thread::yield_now();
        }

        let recon = orchestrator.take_recon().expect("recon picture should be buffered");
        assert_eq!(recon.picture_number, 0);
        assert_eq!(recon.width, 64);
        assert_eq!(recon.height, 64);
        orchestrator.join().unwrap();
    }
}
