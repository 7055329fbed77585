//! Static legend derived once from the score ramp table. No runtime
//! dependency on the rest of the client.

use crate::style::SCORE_RAMP;

pub struct LegendEntry {
    pub color: &'static str,
    pub label: String,
}

pub struct Legend {
    pub title: &'static str,
    pub formula: &'static str,
    pub note: &'static str,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn from_ramp() -> Self {
        let last = SCORE_RAMP.len() - 1;
        let entries = SCORE_RAMP
            .iter()
            .enumerate()
            .map(|(i, &(score, color))| {
                let mut label = format_score(score);
                if i == last {
                    label.push('+');
                }
                LegendEntry { color, label }
            })
            .collect();

        Legend {
            title: "Underserved Areas (Score)",
            formula: "Score = population x travel distance (m)",
            note: "Redder = more underserved",
            entries,
        }
    }
}

fn format_score(score: f64) -> String {
    if score >= 1_000_000.0 {
        let millions = score / 1_000_000.0;
        if millions.fract() == 0.0 {
            format!("{}M", millions as u64)
        } else {
            format!("{}M", millions)
        }
    } else if score >= 1_000.0 {
        format!("{}K", (score / 1_000.0) as u64)
    } else {
        format!("{}", score as u64)
    }
}
