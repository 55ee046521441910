//! `anvil agent` — Interactive or single-goal mode.
//!
//! One process is one session: the registry, session state and conversation
//! history are built once and persist across every goal typed at the prompt.

use anvil_agent::{AgentEvent, ReactAgent, ReactResult, SessionState};
use anvil_config::AppConfig;
use anvil_core::message::Conversation;
use anvil_core::text::clip;
use anvil_core::tool::{ExecutionContext, ToolRegistry};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

/// Longest observation echoed to the terminal.
const OBSERVATION_PREVIEW: usize = 600;

const HELP: &str = "\
  :help       Show this help
  :tools      List the available tools
  :state      Show what the agent remembers about this session
  :ls [path]  List a directory (defaults to the last modified file, then the root)
  :clear      Forget the conversation history (session state is kept)
  :quit       Exit (also :exit)
  Anything else is sent to the agent as a goal. End a line with \\ to continue it.";

/// A line typed at the REPL prompt.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Empty,
    Help,
    Tools,
    State,
    Ls(Option<String>),
    Clear,
    Quit,
    Unknown(String),
    Goal(String),
}

impl ReplInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with(':') {
            return Self::Goal(line.to_string());
        }

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        match name.as_str() {
            ":help" => Self::Help,
            ":tools" => Self::Tools,
            ":state" => Self::State,
            ":ls" => Self::Ls(parts.next().map(str::to_string)),
            ":clear" => Self::Clear,
            ":quit" | ":exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// Collects a goal typed over several lines, each but the last ending in `\`.
#[derive(Debug, Default)]
struct GoalBuffer {
    lines: Vec<String>,
}

impl GoalBuffer {
    fn is_continuing(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Feed one input line. Returns the whole input once a line does not
    /// end in a continuation marker.
    fn push(&mut self, line: &str) -> Option<String> {
        if line.trim_end().ends_with('\\') {
            self.lines
                .push(line.trim_end().trim_end_matches('\\').to_string());
            return None;
        }
        self.lines.push(line.to_string());
        let joined = self.lines.join("\n").trim().to_string();
        self.lines.clear();
        Some(joined)
    }
}

/// Directory `:ls` lists when no path is given.
fn ls_target(arg: Option<String>, state: &SessionState) -> String {
    arg.or_else(|| state.last_modified_file.clone())
        .unwrap_or_else(|| ".".into())
}

/// Render one loop event as terminal lines.
fn render_event(event: &AgentEvent) -> String {
    match event {
        AgentEvent::Thought { step, content } => format!("  [{step}] Thought: {content}"),
        AgentEvent::Action {
            step, tool, args, ..
        } => format!("  [{step}] Action: {tool} {args}"),
        AgentEvent::Observation { step, ok, output } => {
            let mark = if *ok { "ok" } else { "failed" };
            format!(
                "  [{step}] Observation ({mark}): {}",
                clip(output, OBSERVATION_PREVIEW)
            )
        }
        AgentEvent::Degraded { step, detail } => {
            format!("  [{step}] Could not read the reply: {detail}")
        }
        AgentEvent::Final { .. } => String::new(),
        AgentEvent::StepLimit { steps } => {
            format!("  Step limit reached after {steps} steps without a final answer.")
        }
    }
}

fn print_event(event: &AgentEvent) {
    let line = render_event(event);
    if !line.is_empty() {
        println!("{line}");
    }
}

fn print_result(result: &ReactResult) {
    println!();
    if result.finished {
        for line in result.answer.lines() {
            println!("  Anvil > {line}");
        }
    } else {
        println!("  Last reply:");
        for line in result.answer.lines() {
            println!("    {line}");
        }
    }
    println!(
        "  ({} steps, {} tool calls)",
        result.steps, result.tool_calls_made
    );
    println!();
}

/// Run one goal, rendering events as they arrive.
async fn run_goal(
    agent: &ReactAgent,
    events: &mut mpsc::UnboundedReceiver<AgentEvent>,
    goal: &str,
    state: &mut SessionState,
    conversation: &mut Conversation,
) -> Result<ReactResult, anvil_core::Error> {
    let run = agent.run(goal, state, conversation);
    tokio::pin!(run);

    let result = loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => print_event(&event),
            result = &mut run => break result,
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    result
}

fn resolve_workspace(
    config: &AppConfig,
    workspace: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let root = workspace.unwrap_or_else(|| config.workspace_root());
    let canonical = root
        .canonicalize()
        .map_err(|e| format!("Workspace '{}' is not usable: {e}", root.display()))?;
    if !canonical.is_dir() {
        return Err(format!("Workspace '{}' is not a directory", canonical.display()).into());
    }
    Ok(canonical)
}

pub async fn run(
    goal: Option<String>,
    workspace: Option<PathBuf>,
    max_steps: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(max) = max_steps {
        if max == 0 {
            return Err("--max-steps must be at least 1".into());
        }
        config.agent.max_steps = max;
    }

    // Check for API key early — give a clear error
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in .env):");
        eprintln!("    GROQ_API_KEY=gsk_...      (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...     (with ANVIL_PROVIDER=openai)");
        eprintln!("    ANVIL_API_KEY=...         (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let root = resolve_workspace(&config, workspace)?;
    config.default_model = anvil_providers::default_model(&config);

    let router = anvil_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let search = anvil_providers::build_search(&config);
    let tools: Arc<ToolRegistry> = Arc::new(anvil_tools::default_registry(
        ExecutionContext::new(&root),
        &config.tools,
        search,
    )?);

    let mut state = SessionState::initialize(&root, config.tools.snapshot_max_file_size);
    let mut conversation = Conversation::new();

    let (tx, mut events) = mpsc::unbounded_channel();
    let agent = ReactAgent::from_config(provider, Arc::clone(&tools), &config).with_events(tx);

    info!(workspace = %root.display(), provider = %config.default_provider, "Session started");

    if let Some(goal) = goal {
        // Single goal mode
        let result = run_goal(&agent, &mut events, &goal, &mut state, &mut conversation).await?;
        print_result(&result);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          Anvil Agent — Interactive Mode      ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Workspace: {}", root.display());
    println!("  Tools:     {}", tools.names().join(", "));
    println!();
    println!("  Type a goal and press Enter. Type :help for commands.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = GoalBuffer::default();
    loop {
        print!("{}", if pending.is_continuing() { "  ... " } else { "  You > " });
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = pending.push(&line) else {
            continue;
        };

        match ReplInput::parse(&input) {
            ReplInput::Empty => {}
            ReplInput::Help => println!("{HELP}"),
            ReplInput::Tools => {
                for line in tools.listing().lines() {
                    println!("  {line}");
                }
            }
            ReplInput::State => {
                for line in state.context_string().lines() {
                    println!("  {line}");
                }
            }
            ReplInput::Ls(arg) => {
                let path = ls_target(arg, &state);
                let listing = tools
                    .dispatch("list_dir", serde_json::json!({ "path": path }))
                    .await?;
                if listing.ok {
                    println!("  ls {path}");
                    for line in listing.output.lines() {
                        println!("  {line}");
                    }
                } else {
                    println!("  [ERR] {}", listing.output);
                }
            }
            ReplInput::Clear => {
                conversation = Conversation::new();
                println!("  Conversation cleared.");
            }
            ReplInput::Quit => break,
            ReplInput::Unknown(cmd) => println!("  Unknown command {cmd}. Type :help."),
            ReplInput::Goal(goal) => {
                match run_goal(&agent, &mut events, &goal, &mut state, &mut conversation).await {
                    Ok(result) => print_result(&result),
                    Err(e) => {
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
