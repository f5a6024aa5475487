use std::fmt::Write;

use crate::aggregate::SkillTally;

const TITLE: &str = "Most Common Job Skills";

/// Renders the tally as a horizontal text bar chart, one line per skill in
/// tally order. The longest bar is `width` characters wide.
pub fn render_bar_chart(tally: &SkillTally, width: usize) -> String {
    let mut out = format!("{TITLE}\n");
    if tally.is_empty() {
        out.push_str("(no skills matched)\n");
        return out;
    }

    let label_width = tally.iter().map(|(skill, _)| skill.chars().count()).max().unwrap_or(0);
    let max = tally.max();
    for (skill, count) in tally.iter() {
        // Any non-zero count gets at least one mark.
        let bar_len = (count * width).div_ceil(max);
        let _ = writeln!(out, "{skill:<label_width$} | {} {count}", "#".repeat(bar_len));
    }
    out
}
