use crate::stop_registry::StopRegistry;
use crate::timetable::{Timetable, TripColumn};
use gtfs_structures::{format_time, StopTime};

/// Stop times of one trip column, in chronological order
///
/// Stops without a time are skipped. Events are sorted by time with a stable
/// sort, so two stops at the same minute keep the order of the table, and a
/// column whose times go up the table (the return direction) is read from the
/// bottom. `stop_sequence` then runs from 1.
pub fn assemble_stop_times(
    trip_id: &str,
    timetable: &Timetable,
    column: &TripColumn,
    registry: &mut StopRegistry,
) -> Vec<StopTime> {
    let mut events = Vec::with_capacity(column.times.len());
    for (stop_name, time) in timetable.stops.iter().zip(&column.times) {
        match time {
            Some(time) => events.push((*time, registry.resolve(stop_name))),
            None => log::debug!("{}: no time at {}", trip_id, stop_name),
        }
    }
    events.sort_by_key(|(time, _)| *time);

    if let Some(((first, _), (last, _))) = events.first().zip(events.last()) {
        log::debug!(
            "{}: {} stops from {} to {}",
            trip_id,
            events.len(),
            format_time(*first),
            format_time(*last)
        );
    }

    events
        .into_iter()
        .enumerate()
        .map(|(i, (time, stop_id))| StopTime {
            trip_id: trip_id.to_owned(),
            arrival_time: time,
            departure_time: time,
            stop_id,
            stop_sequence: i as u32 + 1,
        })
        .collect()
}
