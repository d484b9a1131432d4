// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.

pub fn print_help(binary_name: &str) {
    println!(
        "Dayslip v{} - Prints your daily agenda to a receipt printer",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} print [--console]    Fetch, format and print today's agenda now", binary_name);
    println!("    {} daemon               Run in the background and print at scheduled times", binary_name);
    println!("    {} config-path          Show the active configuration file path", binary_name);
    println!("    {} --help               Show this help message", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    --console             Write the report to stdout instead of the printer.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("CONFIGURATION:");
    println!("    printer_port          Serial device of the printer (default: COM4)");
    println!("    printer_baudrate      Transfer speed (default: 9600)");
    println!("    schedules             Daily print times as HH:MM (default: 08:00, 12:00, 18:00)");
    println!("    task_priorities       Map of task id -> \"Normal\" | \"High\"");
    println!("    auto_start            Enter daemon mode when run without a subcommand");
    println!();
    println!("    Running '{} config-path' shows where to put the file.", binary_name);
    println!("    Provider credentials go in tokens.json in the data directory.");
}
