//! Terminal styling utilities

use console::style;

pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").cyan(), msg);
}

pub fn print_rule() {
    println!("{}", style("═".repeat(47)).dim());
}
