//! `issues` - Project-scoped issue tracker
//!
//! Create, list, update and delete issues per project, stored in `SQLite`
//! or a JSONL file under `.issues/`.

use issue_tracker::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
