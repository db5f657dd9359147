//! Desktop editor entrypoint.

fn main() {
    let exit_code = run_and_report(quill::run);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("quill failed: {}", err);
            eprintln!("quill error: {}", err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run_and_report;

    #[test]
    fn failures_map_to_exit_code_one() {
        assert_eq!(run_and_report(|| Err::<(), &str>("no display")), 1);
        assert_eq!(run_and_report(|| Ok::<(), &str>(())), 0);
    }
}
