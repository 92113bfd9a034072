pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| {
        let err = format!("Failed to access clipboard: {}", e);
        tracing::error!("{}", err);
        err
    })?;

    clipboard.set_text(text).map_err(|e| {
        let err = format!("Failed to set clipboard text: {}", e);
        tracing::error!("{}", err);
        err
    })?;

    tracing::info!("Copied {} bytes to clipboard", text.len());
    Ok(())
}
