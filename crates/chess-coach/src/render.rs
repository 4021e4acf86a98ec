//! Plain-text rendering for terminal output.

use std::fmt::Write;

use chess_analysis::{GameAnalysis, MoveQuality, PlayerStats};
use chess_openings::{AnnotatedLine, AnnotatedOpening, Opening};

/// One row per opening: id, ECO code, side and name.
pub fn opening_list<'a>(openings: impl IntoIterator<Item = &'a Opening>) -> String {
    let mut out = String::new();
    for opening in openings {
        let _ = writeln!(
            out,
            "{:<28} {:<4} {:<6} {} ({} line{})",
            opening.id,
            opening.eco.as_deref().unwrap_or("-"),
            opening.side,
            opening.name,
            opening.lines.len(),
            if opening.lines.len() == 1 { "" } else { "s" }
        );
    }
    out
}

/// Numbered moves of an annotated line, each with its squares and comment.
pub fn annotated_line(opening: &AnnotatedOpening, line: &AnnotatedLine) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", opening.name, line.name);
    if !opening.description.is_empty() {
        let _ = writeln!(out, "{}", opening.description);
    }
    let _ = writeln!(out);

    for (ply, mv) in line.moves.iter().enumerate() {
        let number = ply / 2 + 1;
        let label = if ply % 2 == 0 {
            format!("{number}.")
        } else {
            format!("{number}...")
        };
        let _ = writeln!(out, "{label:<5} {:<7} {:<20} {}", mv.san, mv.description, mv.comment);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Final position: {}", line.final_placement);
    out
}

fn format_eval(cp: Option<i32>) -> String {
    match cp {
        Some(cp) => format!("{:+.2}", f64::from(cp) / 100.0),
        None => "n/a".to_string(),
    }
}

fn stats_line(name: &str, stats: &PlayerStats) -> String {
    let counts = MoveQuality::ALL
        .iter()
        .filter(|q| stats.count(**q) > 0)
        .map(|q| format!("{} {}", stats.count(*q), q))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{name}: {} moves, avg loss {:.1} cp{}{}",
        stats.total_moves,
        stats.avg_cp_loss,
        if counts.is_empty() { "" } else { " - " },
        counts
    )
}

/// Per-ply review table followed by both players' summaries.
pub fn analysis_table(analysis: &GameAnalysis) -> String {
    let info = &analysis.game_info;
    let mut out = String::new();
    let _ = writeln!(out, "{} vs {} ({}) {}", info.white, info.black, info.event, info.result);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>8} {:>7}  {:<11} best",
        "move", "before", "after", "loss", "grade"
    );

    for (record, label) in analysis.moves.iter().zip(&analysis.move_labels) {
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>8} {:>7}  {:<11} {}",
            label,
            format_eval(record.eval_before),
            format_eval(record.eval_after),
            record
                .cp_loss
                .map_or_else(|| "n/a".to_string(), |l| l.to_string()),
            record.classification.map_or("-", MoveQuality::label),
            record.best_san
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", stats_line(&info.white, &analysis.white_stats));
    let _ = writeln!(out, "{}", stats_line(&info.black, &analysis.black_stats));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::{GameHeaders, PlyAnalysisRecord};
    use chess_core::Color;
    use chess_openings::{builtin, OpeningBook};

    #[test]
    fn test_opening_list() {
        let db = builtin().unwrap();
        let text = opening_list(db.all().iter().take(3));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains(&db.all()[0].name));
    }

    #[test]
    fn test_annotated_line() {
        let db = builtin().unwrap();
        let book = OpeningBook::build(&db).unwrap();
        let opening = &book.openings()[0];
        let text = annotated_line(opening, &opening.lines[0]);

        assert!(text.starts_with(&opening.name));
        assert!(text.contains("1.    "));
        assert!(text.contains(&opening.lines[0].moves[0].description));
        assert!(text.contains(&opening.lines[0].final_placement));
    }

    #[test]
    fn test_format_eval() {
        assert_eq!(format_eval(Some(35)), "+0.35");
        assert_eq!(format_eval(Some(-120)), "-1.20");
        assert_eq!(format_eval(None), "n/a");
    }

    #[test]
    fn test_analysis_table() {
        let moves = vec![PlyAnalysisRecord {
            move_number: 1,
            side: Color::White,
            san: "e4".to_string(),
            best_san: "d4".to_string(),
            eval_before: Some(30),
            eval_after: Some(-200),
            cp_loss: Some(230),
            classification: Some(MoveQuality::Mistake),
        }];
        let analysis = GameAnalysis {
            game_info: GameHeaders::default(),
            white_stats: PlayerStats::from_records(&moves),
            black_stats: PlayerStats::default(),
            moves,
            fens: Vec::new(),
            evals: vec![Some(30), Some(-200)],
            move_labels: vec!["1. e4".to_string()],
        };

        let text = analysis_table(&analysis);
        assert!(text.starts_with("Unknown vs Unknown (Unknown Event) *"));
        assert!(text.contains("1. e4"));
        assert!(text.contains("Mistake"));
        assert!(text.contains("-2.00"));
        assert!(text.contains("1 Mistake"));
    }
}
