//! Groups a set of field addresses into the minimal list of contiguous
//! register ranges a [`crate::reader::DeviceReader`] can issue as MODBUS
//! reads, subject to a maximum registers-per-request `max_registers` and a
//! gap-merge threshold `merge_gap`.
//!
//! `merge_gap` is the number of *unread* registers between two candidate
//! ranges that still gets pulled into one request. Two ranges merge when
//! their gap is strictly less than `merge_gap`, so the default of `0` reads
//! every field as its own range (no speculative reads of registers nobody
//! asked for) while overlapping/touching fields still collapse into one
//! range. Schemas with fields known to sit in tight clusters can pass a
//! larger `merge_gap` to amortize round-trips.

use super::Range;
use crate::fields::Field;

/// Plan ranges covering every field in `fields`. `fields` need not be sorted.
///
/// - Every field's `[address, address+size)` lands fully inside exactly one
///   emitted range.
/// - No emitted range exceeds `max_registers` registers.
/// - Two candidate ranges merge when the register gap between them is
///   `< merge_gap`, unless doing so would exceed `max_registers`, in which
///   case the split falls at the field boundary that keeps both halves valid.
pub fn plan_ranges(fields: &[&Field], max_registers: u16, merge_gap: u16) -> Vec<Range> {
    if fields.is_empty() {
        return Vec::new();
    }

    let mut intervals: Vec<(u16, u16)> = fields
        .iter()
        .map(|f| (f.address(), f.address() + f.size()))
        .collect();
    intervals.sort_unstable();

    let mut ranges = Vec::new();
    let mut cur_lo = intervals[0].0;
    let mut cur_hi = intervals[0].1;

    for &(lo, hi) in &intervals[1..] {
        let gap = lo.saturating_sub(cur_hi);
        let merged_span = hi.max(cur_hi) - cur_lo;
        if gap < merge_gap && merged_span <= max_registers {
            cur_hi = cur_hi.max(hi);
        } else {
            ranges.push(Range::new(cur_lo, cur_hi));
            cur_lo = lo;
            cur_hi = hi;
        }
    }
    ranges.push(Range::new(cur_lo, cur_hi));
    ranges
}
