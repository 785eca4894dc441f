//! One-shot `parley ask` command.

use console::style;

use crate::state::AppState;

/// Send `sentence` through the chat service and print the reply.
pub async fn ask(state: &AppState, sentence: &str, json: bool) -> anyhow::Result<()> {
    let reply = state.chat_service.reply(sentence).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "message": "Success",
                "chat_response": format!("Bot: {reply}"),
            }))?
        );
    } else {
        println!("  {} {}", style("Bot:").cyan().bold(), reply);
    }
    Ok(())
}
