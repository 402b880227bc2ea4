use anyhow::Result;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::io;
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use mockchat::models::{Chat, ChatId, DeliveryStatus, Message, MessageId};
use mockchat::Messenger;

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// What a key press asks the messenger to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    Quit,
    SendText(String),
    SelectChat(ChatId),
    ToggleRecording,
    SendFile,
    Delete(MessageId),
    Forward(MessageId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Chats,
    Messages,
}

pub struct ChatUI {
    input: Input,
    focus: Focus,
    chat_index: usize,
    selected_message: Option<usize>,
    show_help: bool,
}

impl ChatUI {
    pub fn new() -> Self {
        ChatUI {
            input: Input::default(),
            focus: Focus::Messages,
            chat_index: 0,
            selected_message: None,
            show_help: false,
        }
    }

    /// Clears the composer and message selection after the active chat changed.
    pub fn chat_selected(&mut self, messenger: &Messenger) {
        self.input.reset();
        self.selected_message = None;
        if let Some(index) = messenger
            .list_chats()
            .iter()
            .position(|c| c.id == messenger.active_chat_id())
        {
            self.chat_index = index;
        }
    }

    /// Drops the message selection, e.g. after the selected message was
    /// deleted or forwarded.
    pub fn clear_selection(&mut self) {
        self.selected_message = None;
    }

    fn selected_message_id(&self, messenger: &Messenger) -> Option<MessageId> {
        let index = self.selected_message?;
        messenger.active_messages().get(index).map(|m| m.id)
    }

    pub fn handle_event(&mut self, event: &Event, messenger: &Messenger) -> Option<UserIntent> {
        let key = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => *key,
            _ => return None,
        };

        // Any key press closes the help popup
        if self.show_help {
            self.show_help = false;
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_shortcut(key, messenger);
        }

        match key.code {
            KeyCode::Esc => Some(UserIntent::Quit),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Chats => Focus::Messages,
                    Focus::Messages => Focus::Chats,
                };
                None
            }
            KeyCode::Up => {
                self.move_selection(messenger, -1);
                None
            }
            KeyCode::Down => {
                self.move_selection(messenger, 1);
                None
            }
            KeyCode::Enter => match self.focus {
                Focus::Chats => messenger
                    .list_chats()
                    .get(self.chat_index)
                    .map(|chat| UserIntent::SelectChat(chat.id)),
                Focus::Messages => {
                    let text = self.input.value().to_string();
                    if text.trim().is_empty() {
                        return None;
                    }
                    self.input.reset();
                    Some(UserIntent::SendText(text))
                }
            },
            _ => {
                if self.focus == Focus::Messages {
                    self.input.handle_event(event);
                }
                None
            }
        }
    }

    fn handle_shortcut(&mut self, key: KeyEvent, messenger: &Messenger) -> Option<UserIntent> {
        match key.code {
            KeyCode::Char('r') => Some(UserIntent::ToggleRecording),
            KeyCode::Char('f') => Some(UserIntent::SendFile),
            KeyCode::Char('d') => {
                let index = self.selected_message?;
                let message = messenger.active_messages().get(index)?;
                if message.is_outgoing() {
                    Some(UserIntent::Delete(message.id))
                } else {
                    debug!("UI: Only own messages can be deleted");
                    None
                }
            }
            KeyCode::Char('w') => self.selected_message_id(messenger).map(UserIntent::Forward),
            KeyCode::Char('h') => {
                self.show_help = true;
                None
            }
            KeyCode::Char('c') => Some(UserIntent::Quit),
            _ => None,
        }
    }

    fn move_selection(&mut self, messenger: &Messenger, step: isize) {
        match self.focus {
            Focus::Chats => {
                let count = messenger.list_chats().len();
                if count > 0 {
                    self.chat_index = step_index(self.chat_index, step, count);
                }
            }
            Focus::Messages => {
                let count = messenger.active_messages().len();
                if count == 0 {
                    self.selected_message = None;
                    return;
                }
                self.selected_message = Some(match self.selected_message {
                    Some(index) => step_index(index.min(count - 1), step, count),
                    // Start from the newest message
                    None => count - 1,
                });
            }
        }
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>, messenger: &Messenger) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Chats panel
                Constraint::Percentage(70), // Conversation panel
            ])
            .split(size);

        let chat_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Messages
                Constraint::Length(1), // Typing indicator
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Help line
            ])
            .split(chunks[1]);

        self.draw_chats(frame, messenger, chunks[0]);
        draw_header(frame, messenger.active_chat(), chat_chunks[0]);
        draw_messages(
            frame,
            messenger,
            self.selected_message.filter(|_| self.focus == Focus::Messages),
            chat_chunks[1],
        );

        let typing = if messenger.is_typing() {
            Span::styled("  печатает...", Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
        } else {
            Span::raw("")
        };
        frame.render_widget(Paragraph::new(Line::from(typing)), chat_chunks[2]);

        self.draw_composer(frame, messenger, chat_chunks[3]);

        let help = Paragraph::new(Line::from(vec![Span::styled(
            "ESC quit | TAB switch | Ctrl+R record | Ctrl+F file | Ctrl+D del | Ctrl+W fwd | Ctrl+H help",
            Style::default().fg(Color::Gray),
        )]));
        frame.render_widget(help, chat_chunks[4]);

        if self.show_help {
            draw_help_dialog(frame, size);
        }
    }

    fn draw_chats<B: Backend>(&self, frame: &mut Frame<B>, messenger: &Messenger, area: Rect) {
        let active = messenger.active_chat_id();
        let items: Vec<ListItem> = messenger
            .list_chats()
            .iter()
            .enumerate()
            .map(|(i, chat)| {
                let marker = if i == self.chat_index { ">" } else { " " };
                let presence = if chat.is_group() {
                    "👥 "
                } else if chat.online {
                    "🟢 "
                } else {
                    "⚪ "
                };
                let unread = if chat.unread > 0 {
                    format!(" ({})", chat.unread)
                } else {
                    String::new()
                };
                let title = format!("{} {}{}{}  {}", marker, presence, chat.name, unread, chat.time);
                let style = if chat.id == active {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(vec![
                    Line::from(Span::styled(title, style)),
                    Line::from(Span::styled(
                        format!("     {}", chat.last_message),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Chats (Tab to focus)")
                .borders(Borders::ALL)
                .border_style(match self.focus {
                    Focus::Chats => Style::default().fg(Color::Yellow),
                    Focus::Messages => Style::default(),
                }),
        );
        frame.render_widget(list, area);
    }

    fn draw_composer<B: Backend>(&self, frame: &mut Frame<B>, messenger: &Messenger, area: Rect) {
        let border_style = match self.focus {
            Focus::Messages => Style::default().fg(Color::Yellow),
            Focus::Chats => Style::default(),
        };

        if messenger.is_recording() {
            let label = format!(
                "🔴 Recording {}  (Ctrl+R to send)",
                mockchat::sim::duration_label(messenger.recording_elapsed_seconds())
            );
            let widget = Paragraph::new(label)
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title("Voice message").borders(Borders::ALL).border_style(border_style));
            frame.render_widget(widget, area);
            return;
        }

        let widget = Paragraph::new(self.input.value())
            .block(Block::default().title("Message").borders(Borders::ALL).border_style(border_style));
        frame.render_widget(widget, area);

        if self.focus == Focus::Messages {
            frame.set_cursor(
                // Put cursor past the end of the input text
                area.x + self.input.cursor() as u16 + 1,
                area.y + 1,
            );
        }
    }
}

impl Default for ChatUI {
    fn default() -> Self {
        Self::new()
    }
}

fn step_index(index: usize, step: isize, count: usize) -> usize {
    let next = index as isize + step;
    next.clamp(0, count as isize - 1) as usize
}

fn draw_header<B: Backend>(f: &mut Frame<B>, chat: Option<&Chat>, area: Rect) {
    let (title, subtitle) = match chat {
        Some(chat) => {
            let subtitle = match chat.members() {
                Some(members) => format!("{} участников: {}", members.len(), members.join(", ")),
                None if chat.online => "в сети".to_string(),
                None => "не в сети".to_string(),
            };
            (format!("{} [{}]", chat.name, chat.initials()), subtitle)
        }
        None => ("No chat selected".to_string(), String::new()),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(subtitle, Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn status_indicator(status: Option<DeliveryStatus>) -> (&'static str, Style) {
    match status {
        Some(DeliveryStatus::Sending) => (" 🕓", Style::default().fg(Color::Gray)),
        Some(DeliveryStatus::Sent) => (" ✓", Style::default().fg(Color::Gray)),
        Some(DeliveryStatus::Delivered) => (" ✓✓", Style::default().fg(Color::Gray)),
        Some(DeliveryStatus::Read) => (" ✓✓", Style::default().fg(Color::Cyan)),
        None => ("", Style::default()),
    }
}

fn message_lines(message: &Message, sender: &str, wrap_width: usize) -> Vec<String> {
    let (indicator, _) = status_indicator(message.status);
    let full_content = format!("[{}] {}: {}{}", message.time, sender, message.body.summary(), indicator);
    wrap(&full_content, wrap_width.max(1))
        .into_iter()
        .map(|l| l.into_owned())
        .collect()
}

fn draw_messages<B: Backend>(f: &mut Frame<B>, messenger: &Messenger, selected: Option<usize>, area: Rect) {
    let wrap_width = area.width.saturating_sub(2) as usize; // Account for borders
    let contact = messenger
        .active_chat()
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_item = None;
    for (index, message) in messenger.active_messages().iter().enumerate() {
        let sender = if message.is_outgoing() { "Вы" } else { contact.as_str() };
        let (_, status_style) = status_indicator(message.status);
        let mut style = if message.is_outgoing() {
            status_style
        } else {
            Style::default()
        };
        if selected == Some(index) {
            style = style.add_modifier(Modifier::REVERSED);
            selected_item = Some(items.len());
        }
        for line in message_lines(message, sender, wrap_width) {
            items.push(ListItem::new(Text::from(line)).style(style));
        }
    }

    let mut list_state = ListState::default();
    // Keep the newest line (or the selection) in view
    match selected_item {
        Some(item) => list_state.select(Some(item)),
        None if !items.is_empty() => list_state.select(Some(items.len() - 1)),
        None => {}
    }

    let title = format!("Messages ({} min {}s)", messenger.now() / 60_000, (messenger.now() / 1000) % 60);
    let messages_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default());
    f.render_stateful_widget(messages_list, area, &mut list_state);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 16.min(area.height.saturating_sub(4));
    let popup_x = (area.width - popup_width) / 2;
    let popup_y = (area.height - popup_height) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let popup_block = Block::default()
        .title("Keyboard Shortcuts")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Clear, popup_area); // Clear the area first
    f.render_widget(popup_block, popup_area);

    let inner_area = popup_area.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });

    let shortcuts = [
        ("ESC", "Quit"),
        ("Tab", "Switch between chats and messages"),
        ("Up/Down", "Move selection in the focused pane"),
        ("Enter", "Send message / open selected chat"),
        ("Ctrl+R", "Start or stop a voice recording"),
        ("Ctrl+F", "Attach a file"),
        ("Ctrl+D", "Delete the selected own message"),
        ("Ctrl+W", "Forward the selected message"),
        ("Ctrl+H", "Show this help"),
        ("", ""),
        ("", "Press any key to close"),
    ];
    let items: Vec<ListItem> = shortcuts
        .iter()
        .map(|(key, description)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ]))
        })
        .collect();
    f.render_widget(List::new(items), inner_area);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(ui: &mut ChatUI, messenger: &Messenger, text: &str) {
        for c in text.chars() {
            ui.handle_event(&key(KeyCode::Char(c), KeyModifiers::NONE), messenger);
        }
    }

    #[test]
    fn test_enter_sends_typed_text() {
        let messenger = Messenger::default();
        let mut ui = ChatUI::new();
        type_text(&mut ui, &messenger, "Hello");
        assert_eq!(
            ui.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &messenger),
            Some(UserIntent::SendText("Hello".to_string()))
        );
        assert_eq!(ui.input.value(), "");
        assert_eq!(ui.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &messenger), None);
    }

    #[test]
    fn test_chat_pane_selection() {
        let messenger = Messenger::default();
        let mut ui = ChatUI::new();
        ui.handle_event(&key(KeyCode::Tab, KeyModifiers::NONE), &messenger);
        ui.handle_event(&key(KeyCode::Down, KeyModifiers::NONE), &messenger);
        ui.handle_event(&key(KeyCode::Down, KeyModifiers::NONE), &messenger);
        assert_eq!(
            ui.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &messenger),
            Some(UserIntent::SelectChat(ChatId(3)))
        );
    }

    #[test]
    fn test_delete_only_targets_own_messages() {
        let messenger = Messenger::default();
        let mut ui = ChatUI::new();

        // Newest seeded message is incoming
        ui.handle_event(&key(KeyCode::Up, KeyModifiers::NONE), &messenger);
        assert_eq!(ui.handle_event(&key(KeyCode::Char('d'), KeyModifiers::CONTROL), &messenger), None);
        assert_eq!(
            ui.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL), &messenger),
            Some(UserIntent::Forward(MessageId(3)))
        );

        ui.handle_event(&key(KeyCode::Up, KeyModifiers::NONE), &messenger);
        assert_eq!(
            ui.handle_event(&key(KeyCode::Char('d'), KeyModifiers::CONTROL), &messenger),
            Some(UserIntent::Delete(MessageId(2)))
        );
    }

    #[test]
    fn test_help_popup_swallows_next_key() {
        let messenger = Messenger::default();
        let mut ui = ChatUI::new();
        ui.handle_event(&key(KeyCode::Char('h'), KeyModifiers::CONTROL), &messenger);
        assert!(ui.show_help);
        assert_eq!(ui.handle_event(&key(KeyCode::Esc, KeyModifiers::NONE), &messenger), None);
        assert!(!ui.show_help);
        assert_eq!(
            ui.handle_event(&key(KeyCode::Esc, KeyModifiers::NONE), &messenger),
            Some(UserIntent::Quit)
        );
    }
}
