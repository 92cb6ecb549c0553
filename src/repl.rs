use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::normalize::normalize;
use crate::query::QueryClient;
use crate::transport::Transport;

const WRITE_ERR: &str = "Failed to write stdout";

pub async fn run_repl<T, R, W>(
    client: &QueryClient<T>,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    writeln!(output, "--- NLP Question-Answering System (CLI) ---").context(WRITE_ERR)?;
    writeln!(output, "provider: {}", client.provider().as_str()).context(WRITE_ERR)?;
    writeln!(output, "Type 'exit' or 'quit' to stop.").context(WRITE_ERR)?;

    loop {
        write!(output, "\nEnter your question: ").context(WRITE_ERR)?;
        output.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read stdin")?;
        if read == 0 {
            debug!("stdin closed, leaving repl");
            writeln!(output).context(WRITE_ERR)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            writeln!(output, "Exiting...").context(WRITE_ERR)?;
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let question = line.trim_end_matches(['\r', '\n']);
        answer_question(client, question, &mut output).await?;
    }

    Ok(())
}

/// Prints the normalized form of `question` followed by the provider's answer.
pub async fn answer_question<T, W>(
    client: &QueryClient<T>,
    question: &str,
    output: &mut W,
) -> Result<()>
where
    T: Transport,
    W: Write,
{
    let normalized = normalize(question);
    writeln!(output, "\n[Processed]: {}", normalized.text).context(WRITE_ERR)?;
    writeln!(output, "[Tokens]: {:?}", normalized.tokens).context(WRITE_ERR)?;

    writeln!(output, "\nQuerying LLM...").context(WRITE_ERR)?;
    output.flush().context("Failed to flush stdout")?;
    let outcome = client.query(question, None).await;

    writeln!(output, "\n[LLM Answer]:\n{outcome}").context(WRITE_ERR)?;
    Ok(())
}
