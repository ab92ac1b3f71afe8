use flandre_core::keymap::Keymap;
use flandre_core::script;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scripts/mode_switch.txt".to_string());

    let s = script::load_script(&path)?;
    println!(
        "Replaying {} ({} events, term {}ms)",
        s.name.as_deref().unwrap_or(&path),
        s.events.len(),
        s.settings.tapping_term_ms
    );

    let run = script::replay(&s, Keymap::flandre())?;
    for report in run.recorder.reports() {
        println!("  {:?}", report);
    }
    println!("Passed through: {} events", run.passthrough.len());
    println!("Final mode: {:?}", run.mode);

    Ok(())
}
