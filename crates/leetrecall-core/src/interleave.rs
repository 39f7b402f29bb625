//! Fair merge of two ordered lists by proportional progress.

/// Merges `secondary` into `primary` so the shorter list spreads evenly
/// across the output instead of clustering at either end. Relative order
/// within each input is preserved; the result has length
/// `primary.len() + secondary.len()`.
///
/// At each position the element comes from the list whose next item sits at
/// the smaller fractional position (`(taken + 1) / len`); ties go to
/// `secondary`. Interleaving 6 primary with 2 secondary therefore lands the
/// secondary items at the 1/4 and 3/4 marks.
pub fn interleave<T>(primary: Vec<T>, secondary: Vec<T>) -> Vec<T> {
    let plen = primary.len();
    let slen = secondary.len();
    if plen == 0 {
        return secondary;
    }
    if slen == 0 {
        return primary;
    }

    let mut out = Vec::with_capacity(plen + slen);
    let mut p = primary.into_iter();
    let mut s = secondary.into_iter();
    let mut taken_p = 0usize;
    let mut taken_s = 0usize;

    loop {
        let pick_secondary = match (taken_p < plen, taken_s < slen) {
            (false, false) => break,
            (false, true) => true,
            (true, false) => false,
            // Cross-multiplied comparison of (taken_s + 1) / slen with
            // (taken_p + 1) / plen, avoiding float error.
            (true, true) => (taken_s + 1) * plen <= (taken_p + 1) * slen,
        };
        if pick_secondary {
            if let Some(item) = s.next() {
                out.push(item);
                taken_s += 1;
            }
        } else if let Some(item) = p.next() {
            out.push(item);
            taken_p += 1;
        }
    }
    out
}
