//! Chart backtrace (C4). See spec §4.4.
//!
//! Grounded on `original_source/scripts/csidp.py`'s four mutually recursive
//! `leftComplete`/`leftIncomplete`/`rightComplete`/`rightIncomplete`
//! functions, which write `HEAD`/`DEPREL` while walking the chart from
//! `(0, N, Right, true)`.

use crate::chart::{Chart, Side};
use crate::util::{Sentence, TokenIndex};

/// Walk the chart starting at `(0, N, Right, true)` and write `HEAD`/`DEPREL`
/// onto every token. A no-op when `N == 0`.
pub fn backtrace(chart: &Chart, sentence: &mut Sentence) {
    let n = chart.num_tokens();
    right_complete(chart, sentence, 0, n);
}

fn right_complete(chart: &Chart, sentence: &mut Sentence, s: TokenIndex, t: TokenIndex) {
    let cell = chart.get(s, t, Side::Right, true);
    if let Some(r) = cell.split {
        right_incomplete(chart, sentence, s, r);
        right_complete(chart, sentence, r, t);
    }
}

fn right_incomplete(chart: &Chart, sentence: &mut Sentence, s: TokenIndex, t: TokenIndex) {
    let cell = chart.get(s, t, Side::Right, false);
    if let Some(r) = cell.split {
        assert!(t > 0, "right-incomplete span has t == 0");
        let label = cell.edge_label.clone().expect("incomplete span must carry an edge label");
        sentence.set_head_deprel(t, s, label);
        right_complete(chart, sentence, s, r);
        left_complete(chart, sentence, r + 1, t);
    }
}

fn left_complete(chart: &Chart, sentence: &mut Sentence, s: TokenIndex, t: TokenIndex) {
    let cell = chart.get(s, t, Side::Left, true);
    if let Some(r) = cell.split {
        left_complete(chart, sentence, s, r);
        left_incomplete(chart, sentence, r, t);
    }
}

fn left_incomplete(chart: &Chart, sentence: &mut Sentence, s: TokenIndex, t: TokenIndex) {
    let cell = chart.get(s, t, Side::Left, false);
    if let Some(r) = cell.split {
        assert!(s > 0, "left-incomplete span has s == 0");
        let label = cell.edge_label.clone().expect("incomplete span must carry an edge label");
        sentence.set_head_deprel(s, t, label);
        right_complete(chart, sentence, s, r);
        left_complete(chart, sentence, r + 1, t);
    }
}
