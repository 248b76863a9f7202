//! Line-oriented terminal front-end over the [`ViewController`].

mod command;
mod prompt;
mod render;

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;
use tracing::{debug, info};

use command::{Command, HELP};
use prompt::{SharedInput, TerminalConfirmer, TerminalNotifier};
use render::{render_edit, render_form, render_list};

use crate::clients::RegistryClient;
use crate::store::FilteredEntry;
use crate::view::{Notice, Notifier, Outcome, Screen, ViewController};

enum Flow {
    Continue,
    Quit,
}

pub struct TerminalSession<R> {
    controller: ViewController<TerminalConfirmer<R>, TerminalNotifier>,
    input: SharedInput<R>,
    /// Rows as last printed; `edit <row>` and `delete <row>` index into these.
    rows: Vec<FilteredEntry>,
}

async fn read_line<R: AsyncBufRead + Unpin>(input: SharedInput<R>) -> io::Result<Option<String>> {
    let mut lines = input.lock().await;
    lines.next_line().await
}

impl<R> TerminalSession<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(client: RegistryClient, reader: R) -> Self {
        let input: SharedInput<R> = Arc::new(Mutex::new(reader.lines()));
        let controller = ViewController::new(client, TerminalConfirmer::new(Arc::clone(&input)), TerminalNotifier);
        Self {
            controller,
            input,
            rows: Vec::new(),
        }
    }

    /// Reads commands until `quit` or end of input. Registrations and
    /// deletes are reported as they land, between commands. Actions still
    /// pending at exit are waited for.
    pub async fn run(&mut self) -> io::Result<()> {
        info!("Terminal session started");
        println!("{HELP}\n");
        println!("{}", render_form(self.controller.form()));

        loop {
            print!("> ");
            io::stdout().flush()?;

            let has_pending = self.controller.pending() > 0;
            tokio::select! {
                line = read_line(Arc::clone(&self.input)) => {
                    let Some(line) = line? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => {
                            debug!(?command, "Dispatching command");
                            if let Flow::Quit = self.dispatch(command).await {
                                break;
                            }
                        }
                        Err(e) => TerminalNotifier.notify(Notice::warning("Invalid command", e.to_string())),
                    }
                }
                Some(outcome) = self.controller.next_outcome(), if has_pending => {
                    println!();
                    self.land(outcome).await;
                }
            }
        }

        if self.controller.pending() > 0 {
            info!(pending = self.controller.pending(), "Waiting for pending actions");
            self.controller.settle().await;
        }
        info!("Terminal session ended");
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Flow {
        match command {
            Command::Register => {
                self.controller.show_registration();
                self.print_current_form();
            }
            Command::List => {
                self.controller.show_list();
                self.refresh_rows().await;
                if let Some(session) = self.controller.edit() {
                    println!("{}", render_edit(session));
                }
            }
            Command::Set(field, value) => match self.controller.set_field(field, value) {
                Ok(()) => self.print_current_form(),
                Err(e) => TerminalNotifier.notify(Notice::warning("Field not set", e.to_string())),
            },
            Command::Submit => {
                if self.require_screen(Screen::Registration) {
                    if self.controller.submit() {
                        println!("Registering employee...");
                    } else {
                        println!("{}", render_form(self.controller.form()));
                    }
                }
            }
            Command::Clear => {
                self.controller.clear_form();
                if self.controller.screen() == Screen::Registration {
                    self.print_current_form();
                }
            }
            Command::Search(term) => {
                if self.require_screen(Screen::List) {
                    self.rows = self.controller.search(&term).await;
                    println!("{}", render_list(&self.rows));
                }
            }
            Command::Edit(row) => {
                if let Some(entry) = self.listed_row(row) {
                    self.controller.select_edit(&entry);
                    self.print_current_form();
                }
            }
            Command::Save => {
                if self.controller.edit().is_none() {
                    TerminalNotifier.notify(Notice::warning("Nothing to save", "No edit is open."));
                } else if self.controller.confirm_edit().await {
                    self.show_screen().await;
                } else {
                    self.print_current_form();
                }
            }
            Command::Cancel => {
                self.controller.cancel_edit();
                self.show_screen().await;
            }
            Command::Delete(row) => {
                if let Some(entry) = self.listed_row(row) {
                    if self.controller.delete(entry.key).await {
                        println!("Deleting employee...");
                    }
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Reports a finished remote action and redraws the active screen.
    async fn land(&mut self, outcome: Outcome) {
        self.controller.apply(outcome);
        self.show_screen().await;
    }

    async fn show_screen(&mut self) {
        match self.controller.screen() {
            Screen::List if self.controller.edit().is_none() => self.refresh_rows().await,
            _ => self.print_current_form(),
        }
    }

    async fn refresh_rows(&mut self) {
        self.rows = self.controller.rows().await;
        println!("{}", render_list(&self.rows));
    }

    /// The edit overlay when one is open, otherwise the registration form.
    fn print_current_form(&self) {
        match self.controller.edit() {
            Some(session) => println!("{}", render_edit(session)),
            None => println!("{}", render_form(self.controller.form())),
        }
    }

    fn require_screen(&self, screen: Screen) -> bool {
        if self.controller.screen() == screen {
            return true;
        }
        let hint = match screen {
            Screen::Registration => "Type `register` to open the registration form.",
            Screen::List => "Type `list` to open the employee list.",
        };
        TerminalNotifier.notify(Notice::warning("Wrong screen", hint));
        false
    }

    fn listed_row(&self, row: usize) -> Option<FilteredEntry> {
        if !self.require_screen(Screen::List) {
            return None;
        }
        let entry = self.rows.get(row.wrapping_sub(1)).cloned();
        if entry.is_none() {
            TerminalNotifier.notify(Notice::warning("No such row", format!("Row {row} is not listed.")));
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use tokio::io::BufReader;

    use crate::actors::RegistryService;
    use crate::mock_framework::{echo_record, MockEmployeeApi};

    type ScriptedSession = TerminalSession<BufReader<Cursor<Vec<u8>>>>;

    fn start(api: &MockEmployeeApi) -> RegistryClient {
        let (service, client) = RegistryService::new(10, Arc::new(api.clone()));
        tokio::spawn(service.run());
        client
    }

    fn session(client: &RegistryClient, script: impl Into<String>) -> ScriptedSession {
        let reader = BufReader::new(Cursor::new(script.into().into_bytes()));
        TerminalSession::new(client.clone(), reader)
    }

    async fn run_script(client: &RegistryClient, script: impl Into<String>) {
        session(client, script).run().await.unwrap();
    }

    const REGISTER_JOHN: &str = "\
set name John
set surname Doe
set age 25
set idNumber 1234567890123
set role Manager
photo /tmp/john.png
submit
";

    #[tokio::test]
    async fn registers_from_typed_commands() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        run_script(&client, REGISTER_JOHN).await;

        assert_eq!(api.created().len(), 1);
        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.records[0].name, "John");
    }

    #[tokio::test]
    async fn delete_asks_before_removing() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        run_script(&client, REGISTER_JOHN).await;
        run_script(&client, "list\ndelete 1\nn\ndelete 1\nyes\nquit\n").await;

        assert_eq!(api.deleted().len(), 1);
        assert!(client.snapshot().await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn edit_and_save_updates_the_listed_row() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        run_script(&client, REGISTER_JOHN).await;
        run_script(&client, "list\nedit 1\nset role Director\nsave\nquit\n").await;

        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.records[0].role, "Director");
        assert!(api.deleted().is_empty());
    }

    #[tokio::test]
    async fn edit_stays_open_across_screen_changes() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        run_script(&client, REGISTER_JOHN).await;
        run_script(&client, "list\nedit 1\nset role Director\nregister\nlist\nsave\nquit\n").await;

        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.records[0].role, "Director");
    }

    #[tokio::test]
    async fn commands_are_served_while_a_create_is_pending() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        let gate = api.gate_next_create();

        let mut terminal = session(&client, format!("{REGISTER_JOHN}list\nsearch 999\nquit\n"));
        let running = tokio::spawn(async move { terminal.run().await });

        // `search` reaches the service only if the session kept reading input.
        while api.created().is_empty() || client.snapshot().await.unwrap().search_term != "999" {
            tokio::task::yield_now().await;
        }
        assert_eq!(client.snapshot().await.unwrap().in_flight, 1);
        assert!(!running.is_finished());

        gate.send(Ok(echo_record("emp_1", &api.created()[0]))).unwrap();
        running.await.unwrap().unwrap();

        assert_eq!(client.snapshot().await.unwrap().records.len(), 1);
    }

    #[tokio::test]
    async fn row_commands_need_the_list_screen() {
        let api = MockEmployeeApi::new();
        let client = start(&api);
        run_script(&client, REGISTER_JOHN).await;
        run_script(&client, "delete 1\nedit 1\nlist\ndelete 7\nquit\n").await;

        assert!(api.deleted().is_empty());
        assert_eq!(client.snapshot().await.unwrap().records.len(), 1);
    }
}
