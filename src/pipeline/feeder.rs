//! Feeder: pushes every product into the item queue in input order, then closes it.

use crossbeam_channel::{SendTimeoutError, Sender};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::context::CancelToken;
use crate::ProductRecord;
use crate::types::WorkItem;
use crate::utils::config::CANCEL_POLL_INTERVAL;

pub fn spawn_feeder_thread(
    products: Vec<Arc<ProductRecord>>,
    item_tx: Sender<WorkItem>,
    cancel: CancelToken,
) -> JoinHandle<usize> {
    thread::spawn(move || run_feed_loop(products, item_tx, &cancel))
}

/// Send each product tagged with its index. Blocks while the queue is full (backpressure),
/// waking every poll interval to check `cancel`. Stops early on cancel or when every worker
/// has gone. Dropping `item_tx` on return closes the queue. Returns the number of items sent.
pub fn run_feed_loop(
    products: Vec<Arc<ProductRecord>>,
    item_tx: Sender<WorkItem>,
    cancel: &CancelToken,
) -> usize {
    let mut fed = 0_usize;
    'feed: for (index, product) in products.into_iter().enumerate() {
        let mut item = WorkItem { index, product };
        loop {
            if cancel.is_cancelled() {
                debug!("feeder: cancelled after {} items", fed);
                break 'feed;
            }
            match item_tx.send_timeout(item, CANCEL_POLL_INTERVAL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(back)) => item = back,
                Err(SendTimeoutError::Disconnected(_)) => {
                    debug!("feeder: no workers left after {} items", fed);
                    break 'feed;
                }
            }
        }
        fed += 1;
    }
    drop(item_tx);
    fed
}
