use chrono::{Local, NaiveDate};
use pickup_planner::{
    PickupPlanner, PickupTime, ScheduleEntry, WeekView, load_planner_from_json,
    load_schedules_from_csv, save_planner_to_json, save_schedules_to_csv, weekday_name,
};
use std::io::{self, Write};

fn print_help() {
    println!(
        "Commands:\n  help                                Show this help\n  student add <first> <last> [group]  Create a student\n  student list                        List students\n  student delete <id>                 Remove a student and their data\n  sick <id> <true|false>              Set the sickness flag\n  sched <id> <weekday> <HH:MM> [text] Set one weekly schedule entry (1=Mon..5=Fri)\n  sched clear <id>                    Clear the weekly schedule\n  exc add <id> <YYYY-MM-DD> <HH:MM|-> <reason...>\n                                      Create/update the exception for a date ('-' = no pickup)\n  exc del <id> <exception_id>         Delete an exception\n  note add <id> <YYYY-MM-DD> <text...>\n                                      Add a day note\n  note del <id> <note_id>             Delete a day note\n  week <id> [offset]                  Show the resolved week (offset in weeks, default 0)\n  save <json|csv> <path>              Persist planner (csv: weekly schedules only)\n  load <json|csv> <path>              Load planner from disk\n  quit|exit                           Exit"
    );
}

fn render_week_table(view: &WeekView) -> String {
    let headers = ["date", "day", "time", "flags", "notes"];
    let mut rows: Vec<[String; 5]> = Vec::with_capacity(view.days.len());
    for day in &view.days {
        let mut flags = Vec::new();
        if day.is_today {
            flags.push("today");
        }
        if day.is_exception {
            flags.push("exception");
        }
        if day.show_sick {
            flags.push("sick");
        }
        let mut notes = day.effective_notes.clone().unwrap_or_default();
        for note in &day.notes {
            if !notes.is_empty() {
                notes.push_str(" | ");
            }
            notes.push_str(&note.content);
        }
        rows.push([
            day.date.to_string(),
            weekday_name(day.weekday).to_string(),
            day.effective_time
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            flags.join(","),
            notes,
        ]);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            let pad = widths[i].saturating_sub(cell.len());
            if pad > 0 {
                line.push_str(&" ".repeat(pad));
            }
            line.push_str(" |");
        }
        line
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header_cells));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_students(planner: &PickupPlanner) {
    for student in planner.students() {
        println!(
            "  {:>4}  {:<24} group={:<10} sick={}",
            student.id,
            student.full_name(),
            student.group.as_deref().unwrap_or("-"),
            student.is_sick
        );
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    let mut planner = PickupPlanner::new();

    println!("Pickup Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "student" => match parts.next() {
                Some("add") => {
                    let first = parts.next();
                    let last = parts.next();
                    let group = parts.next().map(str::to_string);
                    match (first, last) {
                        (Some(first), Some(last)) => {
                            let student = planner.create_student(first, last, group);
                            println!("Student {} created with id {}.", student.full_name(), student.id);
                        }
                        _ => println!("Usage: student add <first> <last> [group]"),
                    }
                }
                Some("list") => print_students(&planner),
                Some("delete") => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                    Some(id) => {
                        if planner.delete_student(id) {
                            println!("Student {id} deleted.");
                        } else {
                            println!("Student {id} not found.");
                        }
                    }
                    None => println!("Usage: student delete <id>"),
                },
                _ => println!("Usage: student add|list|delete ..."),
            },
            "sick" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let flag = parts.next().and_then(|s| s.parse::<bool>().ok());
                match (id, flag) {
                    (Some(id), Some(flag)) => match planner.set_sick(id, flag) {
                        Ok(()) => println!("Sickness flag for student {id} set to {flag}."),
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: sick <id> <true|false>"),
                }
            }
            "sched" => {
                let first = parts.next();
                if first == Some("clear") {
                    match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                        Some(id) => match planner.replace_weekly_schedule(id, &[]) {
                            Ok(_) => println!("Weekly schedule cleared for student {id}."),
                            Err(e) => println!("Error: {e}"),
                        },
                        None => println!("Usage: sched clear <id>"),
                    }
                    continue;
                }
                let id = first.and_then(|s| s.parse::<i64>().ok());
                let weekday = parts.next().and_then(|s| s.parse::<u8>().ok());
                let time = parts.next();
                let notes = parts.collect::<Vec<_>>().join(" ");
                match (id, weekday, time) {
                    (Some(id), Some(weekday), Some(time)) => {
                        // Rebuild the bulk payload from the stored rows with
                        // this weekday replaced, so the planner's normalize
                        // path stays the single write route.
                        let mut entries: Vec<ScheduleEntry> = match planner.snapshot(id) {
                            Ok(snapshot) => snapshot
                                .schedules
                                .iter()
                                .filter(|row| row.weekday != weekday)
                                .map(|row| ScheduleEntry {
                                    weekday: row.weekday,
                                    pickup_time: row.pickup_time.map(|t| t.to_string()),
                                    notes: row.notes.clone(),
                                })
                                .collect(),
                            Err(e) => {
                                println!("Error: {e}");
                                continue;
                            }
                        };
                        entries.push(ScheduleEntry {
                            weekday,
                            pickup_time: Some(time.to_string()),
                            notes: if notes.is_empty() { None } else { Some(notes) },
                        });
                        match planner.replace_weekly_schedule(id, &entries) {
                            Ok(_) => println!(
                                "Schedule entry set for {} ({}).",
                                weekday_name(weekday),
                                time
                            ),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: sched <id> <weekday> <HH:MM> [notes...]"),
                }
            }
            "exc" => match parts.next() {
                Some("add") => {
                    let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    let date = parts.next().and_then(parse_date);
                    let time_s = parts.next();
                    let reason = parts.collect::<Vec<_>>().join(" ");
                    match (id, date, time_s) {
                        (Some(id), Some(date), Some(time_s)) => {
                            let time = if time_s == "-" {
                                None
                            } else {
                                match time_s.parse::<PickupTime>() {
                                    Ok(t) => Some(t),
                                    Err(e) => {
                                        println!("Error: {e}");
                                        continue;
                                    }
                                }
                            };
                            match planner.upsert_exception(id, date, time, &reason) {
                                Ok(exc) => println!(
                                    "Exception {} saved for {}.",
                                    exc.id, exc.exception_date
                                ),
                                Err(e) => println!("Error: {e}"),
                            }
                        }
                        _ => println!("Usage: exc add <id> <YYYY-MM-DD> <HH:MM|-> <reason...>"),
                    }
                }
                Some("del") => {
                    let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    let exc_id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    match (id, exc_id) {
                        (Some(id), Some(exc_id)) => match planner.delete_exception(id, exc_id) {
                            Ok(true) => println!("Exception {exc_id} deleted."),
                            Ok(false) => println!("Exception {exc_id} not found."),
                            Err(e) => println!("Error: {e}"),
                        },
                        _ => println!("Usage: exc del <id> <exception_id>"),
                    }
                }
                _ => println!("Usage: exc add|del ..."),
            },
            "note" => match parts.next() {
                Some("add") => {
                    let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    let date = parts.next().and_then(parse_date);
                    let content = parts.collect::<Vec<_>>().join(" ");
                    match (id, date) {
                        (Some(id), Some(date)) => match planner.add_note(id, date, &content) {
                            Ok(note) => println!("Note {} added for {}.", note.id, note.date),
                            Err(e) => println!("Error: {e}"),
                        },
                        _ => println!("Usage: note add <id> <YYYY-MM-DD> <text...>"),
                    }
                }
                Some("del") => {
                    let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    let note_id = parts.next().and_then(|s| s.parse::<i64>().ok());
                    match (id, note_id) {
                        (Some(id), Some(note_id)) => match planner.delete_note(id, note_id) {
                            Ok(true) => println!("Note {note_id} deleted."),
                            Ok(false) => println!("Note {note_id} not found."),
                            Err(e) => println!("Error: {e}"),
                        },
                        _ => println!("Usage: note del <id> <note_id>"),
                    }
                }
                _ => println!("Usage: note add|del ..."),
            },
            "week" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let offset = parts
                    .next()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(0);
                match id {
                    Some(id) => {
                        let today = Local::now().date_naive();
                        match planner.resolve_week(id, today, offset) {
                            Ok(view) => {
                                println!(
                                    "Week of {} ({})",
                                    view.week_start,
                                    view.summary.to_cli_summary()
                                );
                                println!("{}", render_week_table(&view));
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    None => println!("Usage: week <id> [offset]"),
                }
            }
            "save" => {
                let format = parts.next();
                let path = parts.next();
                match (format, path) {
                    (Some("json"), Some(path)) => match save_planner_to_json(&planner, path) {
                        Ok(()) => println!("Planner saved to {path}."),
                        Err(e) => println!("Error saving: {e}"),
                    },
                    (Some("csv"), Some(path)) => match save_schedules_to_csv(&planner, path) {
                        Ok(()) => println!("Schedules saved to {path}."),
                        Err(e) => println!("Error saving: {e}"),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let format = parts.next();
                let path = parts.next();
                match (format, path) {
                    (Some("json"), Some(path)) => match load_planner_from_json(path) {
                        Ok(loaded) => {
                            planner = loaded;
                            println!("Planner loaded from {path}.");
                        }
                        Err(e) => println!("Error loading: {e}"),
                    },
                    (Some("csv"), Some(path)) => match load_schedules_from_csv(path) {
                        Ok(loaded) => {
                            planner = loaded;
                            println!("Planner loaded from {path}.");
                        }
                        Err(e) => println!("Error loading: {e}"),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
