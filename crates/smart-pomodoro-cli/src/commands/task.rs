//! Task management commands for CLI.

use clap::Subcommand;
use smart_pomodoro_core::{Command, Config, Event};

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Register a task (the first one becomes active)
    Add {
        /// Task name
        name: String,
        /// Optional category label
        #[arg(long)]
        category: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Make a task the active one
    Use {
        /// Task ID
        id: String,
    },
    /// Delete a task and its saved timers
    Remove {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let config = Config::load_or_default();
    let mut store = open_store(&config)?;

    match action {
        TaskAction::Add { name, category } => {
            let events = store.dispatch(Command::AddTask { name, category })?;
            for event in &events {
                if let Event::TaskAdded { task_id, .. } = event {
                    println!("Task added: {task_id}");
                    if let Some(task) = store.state().tasks().get(task_id) {
                        print_json(task)?;
                    }
                }
            }
        }
        TaskAction::List { json } => {
            let tasks = store.state().tasks();
            if json {
                print_json(tasks.tasks())?;
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in tasks.tasks() {
                    let marker = if tasks.active_id() == Some(task.id.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    match &task.category {
                        Some(category) => {
                            println!("{marker} {}  {} [{category}]", task.id, task.name)
                        }
                        None => println!("{marker} {}  {}", task.id, task.name),
                    }
                }
            }
        }
        TaskAction::Use { id } => {
            if !store.state().tasks().contains(&id) {
                return Err(format!("Task not found: {id}").into());
            }
            let events = store.dispatch(Command::SetActiveTask { id })?;
            print_json(&events)?;
        }
        TaskAction::Remove { id } => {
            if !store.state().tasks().contains(&id) {
                return Err(format!("Task not found: {id}").into());
            }
            store.dispatch(Command::RemoveTask { id: id.clone() })?;
            println!("Task removed: {id}");
        }
    }
    Ok(())
}
