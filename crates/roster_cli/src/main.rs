//! Interactive command-line shell over the roster core.
//!
//! # Responsibility
//! - Parse startup options and bootstrap logging + the database.
//! - Translate line commands into shell state-machine actions and render
//!   the results.
//!
//! # Invariants
//! - All record/report logic lives in `roster_core`; this binary only
//!   parses input and prints output.

use anyhow::Context;
use clap::Parser;
use roster_core::db::open_db;
use roster_core::{
    default_log_level, init_logging, render_report, Shell, SqliteStudentRepository, Student,
    StudentForm, StudentRepository, StudentService, COURSE_SUGGESTIONS,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Student record manager")]
struct Cli {
    /// Path to the SQLite database file (created on first run).
    #[arg(long, default_value = "student_records.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging stays off when
    /// unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, &dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database at {}", cli.db.display()))?;
    let repo = SqliteStudentRepository::try_new(&conn)
        .context("database connection is not ready for use")?;
    let shell = Shell::new(StudentService::new(repo))?;

    run(shell)
}

fn run<R: StudentRepository>(mut shell: Shell<R>) -> anyhow::Result<()> {
    println!("Student record shell. Type `help` for commands.");
    print_records(shell.records());

    let stdin = io::stdin();
    loop {
        if let Some(id) = shell.pending_delete() {
            print!("delete student {id}? (confirm/cancel) > ");
        } else {
            print!("roster> ");
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ' ');
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();

        match command {
            "help" => print_help(),
            "list" => match shell.refresh() {
                Ok(()) => print_records(shell.records()),
                Err(err) => println!("Error: {err}"),
            },
            "select" => match arg.parse::<i64>() {
                Ok(id) => match shell.select(id) {
                    Ok(()) => {
                        println!("Editing student {id}.");
                        print_form(shell.form());
                    }
                    Err(err) => println!("Error: {err}"),
                },
                Err(_) => println!("Usage: select <id>"),
            },
            "form" => print_form(shell.form()),
            "set" => match apply_set(shell.form_mut(), arg, rest) {
                Ok(()) => {}
                Err(message) => println!("Error: {message}"),
            },
            "add" => match shell.submit_add() {
                Ok(id) => {
                    println!("Added student {id}.");
                    print_records(shell.records());
                }
                Err(err) => println!("Error: {err}"),
            },
            "update" => match shell.submit_update() {
                Ok(id) => {
                    println!("Updated student {id}.");
                    print_records(shell.records());
                }
                Err(err) => println!("Error: {err}"),
            },
            "delete" => match shell.request_delete() {
                Ok(id) => println!("About to delete student {id}; type `confirm` or `cancel`."),
                Err(err) => println!("Error: {err}"),
            },
            "confirm" => match shell.confirm_delete() {
                Ok(id) => {
                    println!("Deleted student {id}.");
                    print_records(shell.records());
                }
                Err(err) => println!("Error: {err}"),
            },
            "cancel" => {
                shell.cancel_delete();
                println!("Delete cancelled.");
            }
            "clear" => {
                shell.clear();
                println!("Form cleared.");
            }
            "report" => match shell.aggregate() {
                Ok(report) => print!("{}", render_report(&report)),
                Err(err) => println!("Error: {err}"),
            },
            "export-csv" => {
                if arg.is_empty() {
                    println!("Usage: export-csv <path>");
                } else {
                    match shell.export_csv(join_path(arg, rest)) {
                        Ok(rows) => println!("Exported {rows} records."),
                        Err(err) => println!("Error: {err}"),
                    }
                }
            }
            "export-report" => {
                if arg.is_empty() {
                    println!("Usage: export-report <path>");
                } else {
                    match shell.export_report(join_path(arg, rest)) {
                        Ok(()) => println!("Report written."),
                        Err(err) => println!("Error: {err}"),
                    }
                }
            }
            "quit" | "exit" => break,
            other => println!("Unknown command `{other}`; type `help`."),
        }
    }

    Ok(())
}

/// Re-joins a path argument that the 3-way command split may have cut.
fn join_path(arg: &str, rest: &str) -> PathBuf {
    if rest.is_empty() {
        PathBuf::from(arg)
    } else {
        PathBuf::from(format!("{arg} {rest}"))
    }
}

fn apply_set(form: &mut StudentForm, field: &str, value: &str) -> Result<(), String> {
    match field {
        "name" => form.name = value.to_string(),
        "roll" | "roll_number" => form.roll_number = value.to_string(),
        "email" => form.email = value.to_string(),
        "phone" => form.phone = value.to_string(),
        "course" => form.course = value.to_string(),
        "year" => {
            form.year = value
                .parse()
                .map_err(|_| format!("year must be an integer, got `{value}`"))?;
        }
        "attendance" => {
            form.attendance = value
                .parse()
                .map_err(|_| format!("attendance must be a number, got `{value}`"))?;
        }
        "grade" => {
            form.grade = value
                .parse()
                .map_err(|_| format!("grade must be a number, got `{value}`"))?;
        }
        "" => return Err("Usage: set <field> <value>".to_string()),
        other => return Err(format!("unknown field `{other}`")),
    }
    Ok(())
}

fn print_records(students: &[Student]) {
    if students.is_empty() {
        println!("(no student records)");
        return;
    }

    println!(
        "{:>4}  {:<20} {:<12} {:<10} {:>4} {:>8} {:>6}",
        "ID", "Name", "Roll", "Course", "Year", "Attend%", "Grade"
    );
    for student in students {
        println!(
            "{:>4}  {:<20} {:<12} {:<10} {:>4} {:>8.1} {:>6.1}",
            student.id,
            student.name,
            student.roll_number,
            student.course,
            student.year,
            student.attendance,
            student.grade
        );
    }
}

fn print_form(form: &StudentForm) {
    println!("name:       {}", form.name);
    println!("roll:       {}", form.roll_number);
    println!("email:      {}", form.email);
    println!("phone:      {}", form.phone);
    println!("course:     {}  (suggestions: {})", form.course, COURSE_SUGGESTIONS.join(", "));
    println!("year:       {}", form.year);
    println!("attendance: {}", form.attendance);
    println!("grade:      {}", form.grade);
}

fn print_help() {
    println!("Commands:");
    println!("  list                   reload and show all records");
    println!("  select <id>            load a record into the form");
    println!("  form                   show the current form");
    println!("  set <field> <value>    edit a form field");
    println!("                         fields: name roll email phone course year attendance grade");
    println!("  add                    create a record from the form");
    println!("  update                 save the form over the selected record");
    println!("  delete                 delete the selected record (asks to confirm)");
    println!("  clear                  reset the form");
    println!("  report                 show the aggregate report");
    println!("  export-csv <path>      write all records as CSV");
    println!("  export-report <path>   write the aggregate report as text");
    println!("  quit                   exit");
}
