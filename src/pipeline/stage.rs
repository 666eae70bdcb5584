// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Worker-loop scaffolding (§5): every stage worker is a get-fifo /
//! do-work / post-fifo loop that blocks on its input fifo and exits once it
//! observes end-of-stream, re-posting EOS downstream before exiting so it
//! drains through the whole graph.

use log::{debug, trace, warn};

use crate::error::PipelineError;
use crate::pipeline::fifo::{FifoReceiver, FifoSender, Message};

/// Runs one stage worker to completion: pulls items from `input`, applies
/// `process` to each, and forwards its result to `output`. EOS is forwarded
/// once and then the loop returns. A [`PipelineError`] from `process` is
/// forwarded as a fatal error to the next stage and also returned to the
/// caller, who is expected to have the orchestrator tear the session down.
pub fn run_worker<In, Out, F>(
    stage: &'static str,
    input: &FifoReceiver<In>,
    output: &FifoSender<Out>,
    mut process: F,
) -> Result<(), PipelineError>
where
    F: FnMut(In) -> Result<Out, PipelineError>,
{
    debug!("stage {stage} starting");
    loop {
        match input.recv()? {
            Some(Message::Item(item)) => {
                trace!("stage {stage} got item");
                let produced = process(item)?;
                trace!("stage {stage} posted item");
                output.send(produced)?;
            }
            Some(Message::Eos) | None => {
                debug!("stage {stage} stopping on eos");
                if let Err(err) = output.send_eos() {
                    warn!("stage {stage} failed to forward eos: {err}");
                    return Err(err);
                }
                return Ok(());
            }
        }
    }
}
