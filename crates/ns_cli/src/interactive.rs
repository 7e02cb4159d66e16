use ns_core::{Article, Result};
use ns_search::{PendingSearch, QueryController, SearchOutcome, SearchTicket};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use crate::render::{render_failure, render_history, render_results};
use crate::spinner::Spinner;

const HELP: &str = "\
Type a query and press enter to search.
  :h N       search recent search N again
  :open N    open article N in the browser
  :retry     repeat the last failed search
  :history   show recent searches
  :help      show this message
  :quit      exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    History(usize),
    Open(usize),
    Retry,
    ShowHistory,
    Help,
    Quit,
    Empty,
}

fn parse_position(arg: Option<&str>, command: &str) -> std::result::Result<usize, String> {
    match arg.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Ok(n),
        _ => Err(format!("Usage: :{} N (N starts at 1)", command)),
    }
}

pub fn parse_input(line: &str) -> std::result::Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match name {
        "h" | "history" if arg.is_some() => parse_position(arg, "h").map(Input::History),
        "history" => Ok(Input::ShowHistory),
        "h" => Err("Usage: :h N (N starts at 1)".to_string()),
        "o" | "open" => parse_position(arg, "open").map(Input::Open),
        "r" | "retry" => Ok(Input::Retry),
        "?" | "help" => Ok(Input::Help),
        "q" | "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("Unknown command :{} (try :help)", other)),
    }
}

type Completion = (SearchTicket, Result<Vec<Article>>);

struct Screen {
    controller: QueryController,
    completions: mpsc::UnboundedSender<Completion>,
    spinner: Option<Spinner>,
}

impl Screen {
    fn launch(&mut self, pending: Option<PendingSearch>) {
        let Some(pending) = pending else {
            println!("Nothing to search for.");
            prompt();
            return;
        };

        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
        self.spinner = Some(Spinner::start(format!(
            "Searching for \"{}\"...",
            pending.ticket().query()
        )));

        let completions = self.completions.clone();
        tokio::spawn(async move {
            let completion = pending.run().await;
            if completions.send(completion).is_err() {
                debug!("Session closed before the search finished");
            }
        });
    }

    async fn finish(&mut self, ticket: SearchTicket, result: Result<Vec<Article>>) {
        match self.controller.complete(ticket, result).await {
            SearchOutcome::Superseded => return,
            SearchOutcome::Failed(_) => {
                self.stop_spinner();
                if let Some(failed) = self.controller.session().last_error() {
                    println!("{}", render_failure(failed));
                }
            }
            _ => {
                self.stop_spinner();
                println!("{}", render_results(self.controller.session()));
            }
        }
        self.show_history().await;
        prompt();
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
    }

    async fn show_history(&self) {
        if let Some(line) = render_history(&self.controller.history().entries().await) {
            println!("{}", line);
        }
    }

    fn open_article(&self, position: usize) {
        match self.controller.session().articles().get(position - 1) {
            Some(article) => {
                if let Err(e) = open::that(&article.url) {
                    warn!("⚠️ Failed to open {}: {}", article.url, e);
                    println!("Could not open {}", article.url);
                }
            }
            None => println!("No article #{}", position),
        }
    }

    /// Returns false when the session should end.
    async fn handle(&mut self, line: &str) -> bool {
        let input = match parse_input(line) {
            Ok(input) => input,
            Err(message) => {
                println!("{}", message);
                prompt();
                return true;
            }
        };

        match input {
            Input::Quit => return false,
            Input::Query(query) => {
                self.controller.set_query_text(query);
                let pending = self.controller.dispatch();
                self.launch(pending);
                return true;
            }
            Input::History(position) => {
                let entries = self.controller.history().entries().await;
                match entries.get(position - 1) {
                    Some(query) => {
                        self.controller.set_query_text(query.clone());
                        let pending = self.controller.dispatch();
                        self.launch(pending);
                        return true;
                    }
                    None => println!("No recent search #{}", position),
                }
            }
            Input::Retry => {
                if self.controller.session().last_error().is_some() {
                    let pending = self.controller.dispatch_retry();
                    self.launch(pending);
                    return true;
                }
                println!("Nothing to retry.");
            }
            Input::Open(position) => self.open_article(position),
            Input::ShowHistory => match render_history(&self.controller.history().entries().await) {
                Some(line) => println!("{}", line),
                None => println!("No recent searches yet."),
            },
            Input::Help => println!("{}", HELP),
            Input::Empty => {}
        }
        prompt();
        true
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Line-based search session. Searches run on their own tasks so input is
/// accepted while a request is in flight; responses overtaken by a newer
/// search are dropped.
pub async fn run(controller: QueryController) -> Result<()> {
    let (completions, mut receiver) = mpsc::unbounded_channel();
    let mut screen = Screen {
        controller,
        completions,
        spinner: None,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a query to search news, :help for commands.");
    screen.show_history().await;
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !screen.handle(&line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some((ticket, result)) = receiver.recv() => {
                screen.finish(ticket, result).await;
            }
        }
    }

    screen.stop_spinner();
    println!();
    Ok(())
}
