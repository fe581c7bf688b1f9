//! Runs against live databases; start them and run with `--ignored`.
