//! Output formatting for the CLI.

use console::style;
use shoes_cart::cart::{Cart, CartPricing};
use shoes_cart::notify::{Notice, NoticeKind, Notifier};

/// Output handler for CLI messages.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        println!("  {}", format_row(cols, widths));
    }

    /// Print the cart as a table followed by its subtotal.
    pub fn cart(&self, cart: &Cart, pricing: &CartPricing) {
        if self.json {
            self.json(&serde_json::json!({ "items": cart, "pricing": pricing }));
            return;
        }

        if cart.is_empty() {
            self.info("Cart is empty");
            return;
        }

        let widths = [6, 40, 12, 6, 12];
        self.table_row(&["ID", "PRODUCT", "PRICE", "QTY", "TOTAL"], &widths);
        for (item, line) in cart.items().iter().zip(&pricing.line_items) {
            self.table_row(
                &[
                    &item.id.to_string(),
                    &truncate(&item.display_title(), widths[1]),
                    &line.unit_price.display(),
                    &item.amount.to_string(),
                    &line.total.display(),
                ],
                &widths,
            );
        }
        println!();
        self.kv("Items", &cart.item_count().to_string());
        self.kv("Subtotal", &style(pricing.subtotal.display()).bold().to_string());
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Prints cart notices as toasts on stderr.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    output: Output,
}

impl ConsoleNotifier {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        if self.output.is_json() {
            eprintln!("{}", serde_json::json!({ "notice": notice }));
            return;
        }
        match notice.kind {
            NoticeKind::OutOfStock => self.output.warn(&notice.message),
            NoticeKind::Failure => eprintln!("{} {}", style("✗").red(), notice.message),
        }
    }
}

fn format_row(cols: &[&str], widths: &[usize]) -> String {
    cols.iter()
        .zip(widths.iter())
        .map(|(col, width)| format!("{:width$}", col, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
