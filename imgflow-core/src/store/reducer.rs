//! Pure state transitions.
//!
//! Only the events listed here touch state; every other event passes through
//! untouched and exists for listeners alone.

use imgflow_sdk::objects::SchedulerName;

use super::state::{AppState, ControlNetEntry, MAX_FAVORITE_SCHEDULERS};
use crate::events::AppEvent;

/// Apply `event` to `state`. Returns `true` if anything changed.
pub fn reduce(state: &mut AppState, event: &AppEvent) -> bool {
    let control_nets = &mut state.control_net.control_nets;
    match event {
        AppEvent::ControlNetAdded {
            control_net_id,
            processor_node,
            control_image,
        } => {
            let mut entry = ControlNetEntry::new(control_net_id.clone(), processor_node.clone());
            entry.control_image = control_image.clone();
            control_nets.insert(control_net_id.clone(), entry);
            true
        }
        AppEvent::ControlNetRemoved { control_net_id } => {
            control_nets.remove(control_net_id).is_some()
        }
        AppEvent::ControlNetImageChanged {
            control_net_id,
            control_image,
        } => match control_nets.get_mut(control_net_id) {
            Some(entry) => {
                entry.control_image = control_image.clone();
                entry.processed_control_image = None;
                entry.processed_at = None;
                true
            }
            None => false,
        },
        AppEvent::ControlNetProcessorChanged {
            control_net_id,
            processor_node,
        } => match control_nets.get_mut(control_net_id) {
            Some(entry) => {
                entry.processor_node = processor_node.clone();
                true
            }
            None => false,
        },
        AppEvent::ControlNetProcessedImageChanged {
            control_net_id,
            processed_control_image,
        } => match control_nets.get_mut(control_net_id) {
            Some(entry) => {
                entry.processed_control_image = Some(processed_control_image.clone());
                entry.processed_at = Some(time::OffsetDateTime::now_utc().unix_timestamp());
                true
            }
            None => false,
        },
        AppEvent::FavoriteSchedulersChanged { schedulers } => {
            state.ui.favorite_schedulers = normalize_favorites(schedulers);
            true
        }
        _ => false,
    }
}

/// Drop duplicates (first occurrence wins) and cap the selection size.
fn normalize_favorites(schedulers: &[SchedulerName]) -> Vec<SchedulerName> {
    let mut out: Vec<SchedulerName> = Vec::with_capacity(schedulers.len());
    for s in schedulers {
        if out.len() == MAX_FAVORITE_SCHEDULERS {
            break;
        }
        if !out.contains(s) {
            out.push(*s);
        }
    }
    out
}
