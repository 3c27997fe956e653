//! The `cognitex chat` command.

use std::io::{BufRead, Write};

use anyhow::Result;

use cognitex_core::chat::{ChatSession, Sender};
use cognitex_core::flows::FlowKind;

use super::Runtime;
use crate::ServiceArgs;

pub async fn execute(service: ServiceArgs) -> Result<()> {
    let runtime = Runtime::load(&service)?;
    let contract = runtime.catalog.get(FlowKind::MotivationalSupport);
    let mut session = ChatSession::new(runtime.locale);

    let mut out = std::io::stdout();
    for message in session.messages() {
        writeln!(out, "{}: {}", speaker(message.sender), message.text)?;
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "you> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if matches!(line, "/quit" | "/exit") {
            break;
        }
        if let Some(reply) = session.send(&runtime.invoker, contract, line).await {
            writeln!(out, "{}: {}", speaker(reply.sender), reply.text)?;
        }
    }

    tracing::debug!(messages = session.messages().len(), "chat closed");
    Ok(())
}

fn speaker(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Assistant => "cogni",
    }
}
