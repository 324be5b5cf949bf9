//! Paged-editor demo (for testing purposes only)
//! The main interface is through WASM bindings.
//!
//! Simulates a typing session on a virtual clock and prints how the page
//! breaks follow the edits. Set `RUST_LOG=paged_editor=debug` to watch the
//! scheduler.

use paged_editor::{Editor, EditorConfig};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_pages(editor: &Editor, now_ms: u64) {
    println!(
        "t={now_ms:>5}ms  pages={}  breaks={:?}  generation={}",
        editor.page_count(),
        editor.state().breaks(),
        editor.state().generation()
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    println!("Paged Editor Core");
    println!("=================");
    println!();

    let text = (1..=30)
        .map(|i| format!("Paragraph {i} of the demo document."))
        .collect::<Vec<_>>()
        .join("\n");
    let mut now_ms = 0;
    let mut editor = Editor::with_text(&text, EditorConfig::default(), now_ms)?;
    print_pages(&editor, now_ms);

    now_ms = 300;
    editor.tick(now_ms);
    print_pages(&editor, now_ms);

    // A burst of keystrokes at the start of the document
    for word in ["Lorem ", "ipsum ", "dolor ", "sit ", "amet. "] {
        now_ms += 40;
        editor.insert_text(1, word, now_ms)?;
        editor.tick(now_ms);
        print_pages(&editor, now_ms);
    }

    // Twenty new paragraphs pasted in one go
    now_ms += 40;
    let pasted = "\nPasted line.".repeat(20);
    editor.insert_text(2, &pasted, now_ms)?;
    print_pages(&editor, now_ms);

    while let Some(deadline) = editor.next_deadline() {
        now_ms = deadline;
        editor.tick(now_ms);
    }
    print_pages(&editor, now_ms);

    println!();
    println!("{}", editor.overlay_json()?);
    println!();
    println!("{:?}", editor.stats());
    Ok(())
}
