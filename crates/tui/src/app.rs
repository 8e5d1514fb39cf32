use std::{io, str::FromStr, thread, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use stockroom_core::{AppConfig, Inventory, Product, ProductCategory};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddProduct,
    SellProduct,
    SearchByName,
    SearchByType,
    ListAll,
    RestockProduct,
    RemoveProduct,
    RemoveExpired,
    TotalValue,
    SaveInventory,
    LoadInventory,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 12] = [
        MenuAction::AddProduct,
        MenuAction::SellProduct,
        MenuAction::SearchByName,
        MenuAction::SearchByType,
        MenuAction::ListAll,
        MenuAction::RestockProduct,
        MenuAction::RemoveProduct,
        MenuAction::RemoveExpired,
        MenuAction::TotalValue,
        MenuAction::SaveInventory,
        MenuAction::LoadInventory,
        MenuAction::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuAction::AddProduct => "Add Product",
            MenuAction::SellProduct => "Sell Product",
            MenuAction::SearchByName => "Search by Name",
            MenuAction::SearchByType => "Search by Type",
            MenuAction::ListAll => "List All Products",
            MenuAction::RestockProduct => "Restock Product",
            MenuAction::RemoveProduct => "Remove Product",
            MenuAction::RemoveExpired => "Remove Expired Groceries",
            MenuAction::TotalValue => "Total Inventory Value",
            MenuAction::SaveInventory => "Save Inventory",
            MenuAction::LoadInventory => "Load Inventory",
            MenuAction::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    Add,
    Sell,
    Restock,
    Remove,
    SearchName,
    SearchType,
}

/// Line-input form collecting one answer per prompt.
struct FormState {
    kind: FormKind,
    prompts: Vec<&'static str>,
    answers: Vec<String>,
    buffer: String,
    category: Option<ProductCategory>,
}

impl FormState {
    fn new(kind: FormKind) -> Self {
        let prompts = match kind {
            FormKind::Add => vec!["Type (Electronics, Grocery, Clothing)"],
            FormKind::Sell => vec!["Product ID to sell", "Quantity to sell"],
            FormKind::Restock => vec!["Product ID to restock", "Quantity to restock"],
            FormKind::Remove => vec!["Product ID to remove"],
            FormKind::SearchName => vec!["Name to search"],
            FormKind::SearchType => vec!["Type to search (Electronics, Grocery, Clothing)"],
        };
        Self {
            kind,
            prompts,
            answers: Vec::new(),
            buffer: String::new(),
            category: None,
        }
    }

    /// Extend an Add form with the base prompts plus the fields of
    /// the chosen variant.
    fn extend_for(&mut self, category: ProductCategory) {
        self.category = Some(category);
        self.prompts
            .extend_from_slice(&["Product ID", "Name", "Price", "Quantity in stock"]);
        let extra: &[&'static str] = match category {
            ProductCategory::Electronics => &["Warranty (in years)", "Brand"],
            ProductCategory::Grocery => &["Expiry Date (YYYY-MM-DD)"],
            ProductCategory::Clothing => &["Size", "Material"],
        };
        self.prompts.extend_from_slice(extra);
    }

    fn current_prompt(&self) -> &'static str {
        self.prompts.get(self.answers.len()).copied().unwrap_or("")
    }

    fn is_complete(&self) -> bool {
        self.answers.len() >= self.prompts.len()
    }
}

/// High-level application state for the inventory TUI.
pub struct StockroomApp {
    config: AppConfig,
    inventory: Inventory,
    state: UiState,
    form: Option<FormState>,
    theme: Theme,
}

impl StockroomApp {
    pub fn new(config: AppConfig, inventory: Inventory) -> Self {
        Self {
            config,
            inventory,
            state: UiState::default(),
            form: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state
            .set_status(format!("{} products in catalog", self.inventory.len()));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => {
                    if let Err(err) = self.handle_input(event) {
                        self.state.set_status(format!("Error: {err}"));
                    }
                }
                Some(AppEvent::Tick) => {}
                None => break,
            }
            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => {
                if self.form.is_some() {
                    self.handle_form_key(key)
                } else {
                    self.handle_menu_key(key)
                }
            }
            Event::Resize(_, _) | Event::Mouse(_) => Ok(()),
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => Ok(()),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.move_menu_cursor(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.move_menu_cursor(-1);
            }
            KeyCode::PageDown => {
                self.state.scroll_output(5);
            }
            KeyCode::PageUp => {
                self.state.scroll_output(-5);
            }
            KeyCode::Enter => {
                self.activate(MenuAction::ALL[self.state.menu_cursor])?;
            }
            _ => {}
        }
        Ok(())
    }

    fn activate(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::AddProduct => self.begin_form(FormKind::Add),
            MenuAction::SellProduct => self.begin_form(FormKind::Sell),
            MenuAction::SearchByName => self.begin_form(FormKind::SearchName),
            MenuAction::SearchByType => self.begin_form(FormKind::SearchType),
            MenuAction::RestockProduct => self.begin_form(FormKind::Restock),
            MenuAction::RemoveProduct => self.begin_form(FormKind::Remove),
            MenuAction::ListAll => {
                let lines = self.inventory.list_all();
                if lines.is_empty() {
                    self.state
                        .set_output(vec!["No products in inventory.".to_string()]);
                    self.state.set_status("Inventory is empty".to_string());
                } else {
                    self.state.set_status(format!("Listed {} products", lines.len()));
                    self.state.set_output(lines);
                }
            }
            MenuAction::RemoveExpired => {
                let removed = self.inventory.remove_expired_groceries();
                if removed.is_empty() {
                    self.state
                        .set_status("No expired grocery products found.".to_string());
                } else {
                    info!(count = removed.len(), "Expired groceries removed");
                    self.state.set_status(format!(
                        "Removed expired products: {}",
                        removed.join(", ")
                    ));
                }
            }
            MenuAction::TotalValue => {
                self.state.set_status(format!(
                    "Total Inventory Value: {}",
                    self.inventory.total_inventory_value()
                ));
            }
            MenuAction::SaveInventory => {
                let path = self.config.inventory_path();
                match self.inventory.save_to_file(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), "Inventory saved");
                        self.state
                            .set_status(format!("Inventory saved to {}", path.display()));
                    }
                    Err(err) => {
                        error!("Failed to save inventory: {err:#}");
                        self.state
                            .set_status(format!("Failed to save inventory: {err}"));
                    }
                }
            }
            MenuAction::LoadInventory => {
                let path = self.config.inventory_path();
                match self.inventory.load_from_file(&path) {
                    Ok(report) => {
                        info!(
                            path = %path.display(),
                            loaded = report.loaded,
                            skipped = report.skipped.len(),
                            "Inventory loaded"
                        );
                        let mut status = format!(
                            "Inventory loaded from {} ({} products",
                            path.display(),
                            report.loaded
                        );
                        if report.skipped.is_empty() {
                            status.push(')');
                        } else {
                            status.push_str(&format!(", {} skipped)", report.skipped.len()));
                        }
                        self.state.set_status(status);
                    }
                    Err(err) => {
                        error!("Failed to load inventory: {err:#}");
                        self.state
                            .set_status(format!("Failed to load inventory: {err}"));
                    }
                }
            }
            MenuAction::Quit => {
                self.state.should_quit = true;
            }
        }
        Ok(())
    }

    fn begin_form(&mut self, kind: FormKind) {
        let form = FormState::new(kind);
        self.state.set_status(format!("{}: ", form.current_prompt()));
        self.form = Some(form);
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                self.state.set_status("Cancelled".to_string());
            }
            KeyCode::Backspace => {
                if let Some(form) = self.form.as_mut() {
                    form.buffer.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(form) = self.form.as_mut() {
                    form.buffer.push(c);
                }
            }
            KeyCode::Enter => self.advance_form()?,
            _ => {}
        }
        Ok(())
    }

    fn advance_form(&mut self) -> Result<()> {
        let Some(mut form) = self.form.take() else {
            return Ok(());
        };
        let answer = std::mem::take(&mut form.buffer);
        form.answers.push(answer.trim().to_string());

        if form.kind == FormKind::Add && form.category.is_none() {
            match form.answers[0].parse::<ProductCategory>() {
                Ok(category) => {
                    form.extend_for(category);
                    self.form = Some(form);
                }
                Err(err) => self.state.set_status(format!("Error: {err}")),
            }
            return Ok(());
        }

        if form.is_complete() {
            match self.submit_form(form) {
                Ok(status) => self.state.set_status(status),
                Err(err) => self.state.set_status(format!("Error: {err}")),
            }
        } else {
            self.form = Some(form);
        }
        Ok(())
    }

    fn submit_form(&mut self, form: FormState) -> Result<String> {
        match form.kind {
            FormKind::Add => self.submit_add(form),
            FormKind::Sell => {
                let id = parse_field::<u32>(&form.answers[0], "product ID")?;
                let quantity = parse_field::<u32>(&form.answers[1], "quantity")?;
                Ok(self.inventory.sell_product(id, quantity)?)
            }
            FormKind::Restock => {
                let id = parse_field::<u32>(&form.answers[0], "product ID")?;
                let quantity = parse_field::<u32>(&form.answers[1], "quantity")?;
                Ok(self.inventory.restock_product(id, quantity)?)
            }
            FormKind::Remove => {
                let id = parse_field::<u32>(&form.answers[0], "product ID")?;
                Ok(self.inventory.remove_product(id)?)
            }
            FormKind::SearchName => {
                let query = form.answers[0].clone();
                let matches: Vec<String> = self
                    .inventory
                    .search_by_name(&query)
                    .iter()
                    .map(|product| product.to_string())
                    .collect();
                if matches.is_empty() {
                    self.state.set_output(Vec::new());
                    Ok(format!("No products found with name '{query}'."))
                } else {
                    let status = format!("Found {} products matching '{query}'", matches.len());
                    self.state.set_output(matches);
                    Ok(status)
                }
            }
            FormKind::SearchType => {
                let category = form.answers[0].parse::<ProductCategory>()?;
                let matches: Vec<String> = self
                    .inventory
                    .search_by_category(category)
                    .iter()
                    .map(|product| product.to_string())
                    .collect();
                if matches.is_empty() {
                    self.state.set_output(Vec::new());
                    Ok(format!("No products found of type '{category}'."))
                } else {
                    let status = format!("Found {} products of type '{category}'", matches.len());
                    self.state.set_output(matches);
                    Ok(status)
                }
            }
        }
    }

    fn submit_add(&mut self, form: FormState) -> Result<String> {
        let Some(category) = form.category else {
            bail!("product type missing");
        };
        let id = parse_field::<u32>(&form.answers[1], "product ID")?;
        let name = form.answers[2].clone();
        let price = parse_field::<f64>(&form.answers[3], "price")?;
        let quantity = parse_field::<u32>(&form.answers[4], "quantity")?;

        let product = match category {
            ProductCategory::Electronics => {
                let warranty = parse_field::<u32>(&form.answers[5], "warranty")?;
                Product::electronics(id, name, price, quantity, warranty, form.answers[6].clone())
            }
            ProductCategory::Grocery => {
                Product::grocery_from_str(id, name, price, quantity, &form.answers[5])?
            }
            ProductCategory::Clothing => Product::clothing(
                id,
                name,
                price,
                quantity,
                form.answers[5].clone(),
                form.answers[6].clone(),
            ),
        };
        Ok(self.inventory.add_product(product))
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let mut constraints = vec![Constraint::Min(8)];
        if self.form.is_some() {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(3));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
            .split(chunks[0]);

        self.render_menu(frame, body[0]);
        self.render_output(frame, body[1]);

        if self.form.is_some() {
            self.render_input(frame, chunks[1]);
            self.render_status(frame, chunks[2]);
        } else {
            self.render_status(frame, chunks[1]);
        }
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = MenuAction::ALL
            .iter()
            .enumerate()
            .map(|(idx, action)| {
                let line = if idx == self.state.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {}", action.label()),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::raw(format!("  {}", action.label())))
                };
                ListItem::new(line)
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Inventory Menu"),
        );
        frame.render_widget(list, area);
    }

    fn render_output(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.state.output.is_empty() {
            vec![Line::from(Span::styled(
                "Nothing to show yet",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            self.state
                .output
                .iter()
                .map(|line| Line::from(line.as_str()))
                .collect()
        };
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Results"))
            .wrap(Wrap { trim: false })
            .scroll((self.state.output_offset as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let content = Line::from(vec![
            Span::styled(
                format!("{}: ", form.current_prompt()),
                Style::default().fg(self.theme.accent),
            ),
            Span::raw(form.buffer.as_str()),
            Span::styled("▏", Style::default().fg(self.theme.accent)),
        ]);
        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Input (Enter confirms, Esc cancels)"),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Line::from(self.state.status.as_str()))
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(paragraph, area);
    }
}

fn parse_field<T: FromStr>(value: &str, label: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("invalid {label} '{value}'"))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    menu_cursor: usize,
    output: Vec<String>,
    output_offset: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            menu_cursor: 0,
            output: Vec::new(),
            output_offset: 0,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, status: String) {
        self.status = status;
    }

    fn set_output(&mut self, lines: Vec<String>) {
        self.output = lines;
        self.output_offset = 0;
    }

    fn move_menu_cursor(&mut self, delta: isize) {
        let len = MenuAction::ALL.len() as isize;
        let mut idx = self.menu_cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.menu_cursor = idx as usize;
    }

    fn scroll_output(&mut self, delta: isize) {
        let max = self.output.len().saturating_sub(1) as isize;
        let mut offset = self.output_offset as isize + delta;
        if offset < 0 {
            offset = 0;
        } else if offset > max {
            offset = max;
        }
        self.output_offset = offset as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_extends_prompts_per_variant() {
        let mut form = FormState::new(FormKind::Add);
        assert_eq!(form.prompts.len(), 1);
        form.extend_for(ProductCategory::Electronics);
        assert_eq!(form.prompts.len(), 7);
        assert_eq!(form.prompts.last(), Some(&"Brand"));

        let mut form = FormState::new(FormKind::Add);
        form.extend_for(ProductCategory::Grocery);
        assert_eq!(form.prompts.len(), 6);
        assert_eq!(form.prompts.last(), Some(&"Expiry Date (YYYY-MM-DD)"));
    }

    #[test]
    fn menu_cursor_clamps_to_bounds() {
        let mut state = UiState::default();
        state.move_menu_cursor(-3);
        assert_eq!(state.menu_cursor, 0);
        state.move_menu_cursor(100);
        assert_eq!(state.menu_cursor, MenuAction::ALL.len() - 1);
    }

    #[test]
    fn parse_field_reports_the_label() {
        let err = parse_field::<u32>("abc", "product ID").unwrap_err();
        assert!(err.to_string().contains("product ID"));
        assert_eq!(parse_field::<u32>(" 42 ", "quantity").unwrap(), 42);
    }
}
