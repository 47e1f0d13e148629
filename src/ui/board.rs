//! Terminal rendering of the board, the stage registry, and transition results.

use console::style;

use super::icons::{CHECK, COLD, COLUMN, CROSS, HOT, LOCK, PIVOT, SKIP, SPARKLE, WARM};
use crate::board::grouping::GroupedOpportunities;
use crate::board::models::{Opportunity, PipelineStage, Temperature};
use crate::board::registry::CATEGORIES;
use crate::board::transition::TransitionResult;

/// `1234567.8` -> `$1,234,568`.
pub fn format_amount(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${}", out)
    } else {
        format!("${}", out)
    }
}

fn temperature_marker(temperature: Temperature) -> String {
    match temperature {
        Temperature::Hot => HOT.to_string(),
        Temperature::Warm => WARM.to_string(),
        Temperature::Cold => COLD.to_string(),
        Temperature::Unknown => "-".to_string(),
    }
}

fn card_line(opp: &Opportunity) -> String {
    let lock = if opp.is_locked {
        LOCK.to_string()
    } else {
        String::new()
    };
    let amount = opp
        .opportunity_amount
        .map(format_amount)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "    {}{} {} {} {}",
        lock,
        style(&opp.id).dim(),
        opp.name,
        temperature_marker(opp.temperature_or_unknown()),
        style(amount).green()
    )
}

/// Categories in display order, each stage with its count, total, and cards.
pub fn render_board(grouped: &GroupedOpportunities) -> String {
    let mut out = String::new();
    for category in &CATEGORIES {
        out.push_str(&format!("{}\n", style(category.label).bold().underlined()));
        for &stage in category.stages {
            let cards = grouped.bucket(stage);
            out.push_str(&format!(
                "  {}{} ({}) {}\n",
                COLUMN,
                style(stage.label()).cyan(),
                cards.len(),
                style(format_amount(grouped.total_amount(stage))).dim()
            ));
            for opp in cards {
                out.push_str(&card_line(opp));
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out.push_str(&format!("{} opportunities\n", grouped.len()));
    out
}

/// Registry table: order, wire value, label, category.
pub fn render_stages() -> String {
    let mut out = format!(
        "{:<6} {:<24} {:<14} {}\n",
        "Order", "Stage", "Label", "Category"
    );
    out.push_str(&format!(
        "{:<6} {:<24} {:<14} {}\n",
        "-----", "------------------------", "--------------", "--------"
    ));
    for stage in PipelineStage::ALL {
        out.push_str(&format!(
            "{:<6} {:<24} {:<14} {}\n",
            stage.order(),
            stage.as_str(),
            stage.label(),
            stage.category().label()
        ));
    }
    out
}

pub fn render_result(result: &TransitionResult) -> String {
    match result {
        TransitionResult::Ignored(rejection) => {
            format!("{}Drop ignored: {}", SPARKLE, style(rejection).yellow())
        }
        TransitionResult::Applied(opp) => format!(
            "{}Moved {} to {} (saved)",
            CHECK,
            opp.id,
            style(opp.pipeline_stage.label()).green()
        ),
        TransitionResult::LocalOnly(opp) => format!(
            "{}Moved {} to {} (local only, not saved)",
            SKIP,
            opp.id,
            style(opp.pipeline_stage.label()).cyan()
        ),
        TransitionResult::RolledBack {
            opportunity_id,
            stage,
            reason,
        } => format!(
            "{}{}Move of {} to {} rolled back: {}",
            CROSS,
            PIVOT,
            opportunity_id,
            stage.label(),
            style(reason).red()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::demo::demo_opportunities;
    use crate::board::drag::DropRejection;
    use chrono::Utc;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0");
        assert_eq!(format_amount(999.0), "$999");
        assert_eq!(format_amount(1000.0), "$1,000");
        assert_eq!(format_amount(1234567.8), "$1,234,568");
        assert_eq!(format_amount(-45000.0), "-$45,000");
    }

    #[test]
    fn test_render_board_lists_every_stage_in_order() {
        let grouped = GroupedOpportunities::group(&demo_opportunities(Utc::now()));
        let text = console::strip_ansi_codes(&render_board(&grouped)).to_string();

        let mut last = 0;
        for stage in PipelineStage::ALL {
            let header = format!("{} (", stage.label());
            let pos = text.find(&header).unwrap();
            assert!(pos >= last, "{} out of order", stage);
            last = pos;
        }
        assert!(text.contains("Interest (2) $150,000"));
        assert!(text.contains("10 opportunities"));
    }

    #[test]
    fn test_render_empty_board() {
        let text = console::strip_ansi_codes(&render_board(&GroupedOpportunities::empty())).to_string();
        assert!(text.contains("Lost (0) $0"));
        assert!(text.contains("0 opportunities"));
    }

    #[test]
    fn test_render_stages_has_all_wire_values() {
        let text = render_stages();
        for stage in PipelineStage::ALL {
            assert!(text.contains(stage.as_str()));
        }
    }

    #[test]
    fn test_render_results() {
        let ignored = TransitionResult::Ignored(DropRejection::NoTarget);
        assert!(console::strip_ansi_codes(&render_result(&ignored)).contains("Drop ignored"));

        let rolled = TransitionResult::RolledBack {
            opportunity_id: "x".into(),
            stage: PipelineStage::LostLost,
            reason: "boom".into(),
        };
        let text = console::strip_ansi_codes(&render_result(&rolled)).to_string();
        assert!(text.contains("rolled back: boom"));
    }
}
