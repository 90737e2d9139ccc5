use crate::squeeze::SqueezeSummary;
use crate::strategy::{StrategyKind, ToolPaths};

/// Print a squeeze summary in human-readable format
pub fn print_summary(summary: &SqueezeSummary) {
    println!("🗜  {} ({} bytes)", summary.source.display(), summary.source_size);

    for outcome in &summary.outcomes {
        let marker = if Some(outcome.strategy) == summary.best {
            "★"
        } else {
            " "
        };
        match (&outcome.size, &outcome.error) {
            (Some(size), _) => println!(
                "  {marker} {:<10} {:>10} bytes  {}",
                outcome.strategy,
                size,
                format_delta(summary.source_size, *size)
            ),
            (None, Some(error)) => println!("  ✗ {:<10} {}", outcome.strategy, error),
            (None, None) => println!("  ? {:<10} no result", outcome.strategy),
        }
    }

    match (summary.best, summary.saved_bytes) {
        (Some(best), saved) if saved > 0 => {
            println!("✅ {best} saved {saved} bytes");
        }
        (Some(_), _) => println!("⚠️  No strategy beat the original"),
        (None, _) => println!("❌ Every strategy failed"),
    }
}

/// Print where each selected tool resolves to and whether it is present
pub fn print_tool_report(tools: &ToolPaths, strategies: &[StrategyKind]) {
    println!("🔧 Optimizer Tools");
    println!("==================");
    for &kind in strategies {
        let path = tools.get(kind);
        let status = if path.is_file() { "✅" } else { "❌" };
        println!("  {status} {:<10} {}", kind, path.display());
    }
}

fn format_delta(original: u64, size: u64) -> String {
    if original == 0 {
        return String::new();
    }
    let change = (size as f64 - original as f64) / original as f64 * 100.0;
    format!("({change:+.1}%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(1000, 750), "(-25.0%)");
        assert_eq!(format_delta(1000, 1100), "(+10.0%)");
        assert_eq!(format_delta(0, 10), "");
    }
}
