use hbnb_core::console::{self, Console, Flow, PROMPT};
use hbnb_core::{FieldValue, FileStorage, RecordService, RecordStorage};
use std::io::Cursor;
use tempfile::TempDir;

fn console_in(dir: &TempDir) -> Console<FileStorage> {
    let storage = FileStorage::open(dir.path().join("file.json")).unwrap();
    Console::new(RecordService::new(storage))
}

fn exec(console: &mut Console<FileStorage>, line: &str) -> String {
    let mut out = Vec::new();
    console.execute_line(line, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn create(console: &mut Console<FileStorage>, kind: &str) -> String {
    exec(console, &format!("create {kind}")).trim().to_string()
}

#[test]
fn argument_errors_are_reported_in_order() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);

    assert_eq!(exec(&mut console, "create"), "** class name missing **\n");
    assert_eq!(exec(&mut console, "create Spaceship"), "** class doesn't exist **\n");
    assert_eq!(exec(&mut console, "show"), "** class name missing **\n");
    assert_eq!(exec(&mut console, "show Spaceship"), "** class doesn't exist **\n");
    assert_eq!(exec(&mut console, "show City"), "** instance id missing **\n");
    assert_eq!(exec(&mut console, "show City nope"), "** no instance found **\n");
    assert_eq!(exec(&mut console, "destroy City nope"), "** no instance found **\n");
    assert_eq!(exec(&mut console, "update"), "** class name missing **\n");
    assert_eq!(exec(&mut console, "update City nope"), "** no instance found **\n");

    let id = create(&mut console, "City");
    assert_eq!(
        exec(&mut console, &format!("update City {id}")),
        "** attribute name missing **\n"
    );
    assert_eq!(
        exec(&mut console, &format!("update City {id} name")),
        "** value missing **\n"
    );
    assert_eq!(exec(&mut console, "count"), "** class name missing **\n");
    assert_eq!(exec(&mut console, "all Spaceship"), "** class doesn't exist **\n");
}

#[test]
fn create_show_update_count_destroy_flow() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);

    let id = create(&mut console, "City");
    assert_eq!(id.len(), 36);
    assert!(dir.path().join("file.json").exists());

    let shown = exec(&mut console, &format!("show City {id}"));
    assert!(shown.starts_with(&format!("[City] ({id}) {{'id': '{id}'")), "{shown}");

    assert_eq!(exec(&mut console, &format!("update City {id} name \"Lagos\"")), "");
    let shown = exec(&mut console, &format!("show City {id}"));
    assert!(shown.contains("'name': 'Lagos'"), "{shown}");

    create(&mut console, "City");
    create(&mut console, "State");
    assert_eq!(exec(&mut console, "count City"), "2\n");
    assert_eq!(exec(&mut console, "count Review"), "0\n");

    assert_eq!(exec(&mut console, &format!("destroy City {id}")), "");
    assert_eq!(
        exec(&mut console, &format!("show City {id}")),
        "** no instance found **\n"
    );
    assert_eq!(exec(&mut console, "count City"), "1\n");
}

#[test]
fn all_prints_a_bracketed_list() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    assert_eq!(exec(&mut console, "all"), "[]\n");

    let user_id = create(&mut console, "User");
    create(&mut console, "Amenity");

    let users = exec(&mut console, "all User");
    assert!(users.starts_with(&format!("[\"[User] ({user_id})")), "{users}");
    assert!(users.ends_with("}\"]\n"), "{users}");
    assert!(!users.contains("[Amenity]"));

    let everything = exec(&mut console, "all");
    assert!(everything.contains("[User]") && everything.contains("[Amenity]"));
}

#[test]
fn update_coerces_declared_and_inferred_types() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Place");

    exec(&mut console, &format!("update Place {id} max_guest 4"));
    exec(&mut console, &format!("update Place {id} latitude \"7\""));
    exec(&mut console, &format!("update Place {id} rating 4.5"));
    exec(&mut console, &format!("update Place {id} floor 3"));
    exec(
        &mut console,
        &format!(r#"update Place {id} amenity_ids ["a-1", "a-2"]"#),
    );
    assert_eq!(
        exec(&mut console, &format!("update Place {id} number_rooms lots")),
        "** invalid value for number_rooms **\n"
    );

    let key = format!("Place.{id}");
    let place = console.service().storage().get(&key).unwrap();
    assert_eq!(place.get("max_guest"), Some(&FieldValue::Int(4)));
    assert_eq!(place.get("latitude"), Some(&FieldValue::Float(7.0)));
    assert_eq!(place.get("rating"), Some(&FieldValue::Float(4.5)));
    assert_eq!(place.get("floor"), Some(&FieldValue::Int(3)));
    assert_eq!(
        place.get("amenity_ids"),
        Some(&FieldValue::List(vec!["a-1".to_string(), "a-2".to_string()]))
    );
    assert_eq!(place.get("number_rooms"), Some(&FieldValue::Int(0)));
}

#[test]
fn identity_fields_cannot_be_updated() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "User");

    assert_eq!(
        exec(&mut console, &format!("update User {id} created_at \"now\"")),
        "** attribute created_at is read-only **\n"
    );
}

#[test]
fn dot_call_forms_match_plain_commands() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "User");

    assert_eq!(exec(&mut console, "User.count()"), "1\n");
    assert_eq!(
        exec(&mut console, "User.all()"),
        exec(&mut console, "all User")
    );

    exec(
        &mut console,
        &format!("User.update(\"{id}\", \"first_name\", \"Ada\")"),
    );
    let shown = exec(&mut console, &format!("User.show(\"{id}\")"));
    assert!(shown.contains("'first_name': 'Ada'"), "{shown}");

    assert_eq!(
        exec(&mut console, "User.show(\"missing\")"),
        "** no instance found **\n"
    );
    assert_eq!(exec(&mut console, &format!("User.destroy(\"{id}\")")), "");
    assert_eq!(exec(&mut console, "User.count()"), "0\n");
}

#[test]
fn dictionary_update_applies_every_field() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Place");

    let output = exec(
        &mut console,
        &format!("Place.update(\"{id}\", {{\"max_guest\": 3, \"name\": \"Loft\", \"id\": \"x\"}})"),
    );
    assert_eq!(output, "");

    let place = console
        .service()
        .storage()
        .get(&format!("Place.{id}"))
        .unwrap();
    assert_eq!(place.id(), id);
    assert_eq!(place.get("max_guest"), Some(&FieldValue::Int(3)));
    assert_eq!(place.get("name"), Some(&FieldValue::from("Loft")));
}

#[test]
fn rejected_dictionary_update_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Place");

    let output = exec(
        &mut console,
        &format!("Place.update(\"{id}\", {{\"name\": \"Loft\", \"max_guest\": \"many\"}})"),
    );
    assert_eq!(output, "** invalid value for max_guest **\n");

    let place = console
        .service()
        .storage()
        .get(&format!("Place.{id}"))
        .unwrap();
    assert_eq!(place.get("name"), Some(&FieldValue::from("")));
}

#[test]
fn changes_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut console = console_in(&dir);
        let id = create(&mut console, "State");
        exec(&mut console, &format!("update State {id} name \"Oyo\""));
        id
    };

    let mut console = console_in(&dir);
    let shown = exec(&mut console, &format!("show State {id}"));
    assert!(shown.contains("'name': 'Oyo'"), "{shown}");
}

#[test]
fn unknown_syntax_and_help() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);

    assert_eq!(
        exec(&mut console, "fly away"),
        "*** Unknown syntax: fly away\n"
    );
    assert_eq!(exec(&mut console, ""), "");
    assert!(exec(&mut console, "help").contains("create"));
    assert!(exec(&mut console, "help show").starts_with("Prints one record"));

    let mut out = Vec::new();
    assert_eq!(console.execute_line("quit", &mut out).unwrap(), Flow::Quit);
}

#[test]
fn piped_session_runs_until_quit_without_prompts() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let input = Cursor::new("create BaseModel\ncount BaseModel\nquit\ncount BaseModel\n");
    let mut output = Vec::new();

    console::run(&mut console, input, &mut output, false).unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "{text}");
    assert_eq!(lines[1], "1");
    assert!(!text.contains(PROMPT));
}

#[test]
fn interactive_session_prompts_and_ends_on_eof() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let mut output = Vec::new();

    console::run(&mut console, Cursor::new("count User\n"), &mut output, true).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, format!("{PROMPT}0\n{PROMPT}\n"));
}

#[test]
fn update_advances_updated_at_and_missing_destroy_leaves_file() {
    let dir = TempDir::new().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "City");
    let key = format!("City.{id}");
    let before = console.service().storage().get(&key).unwrap().updated_at();

    exec(&mut console, &format!("update City {id} name \"Lagos\""));
    let city = console.service().storage().get(&key).unwrap();
    assert!(city.updated_at() > before);
    assert!(city.updated_at() >= city.created_at());

    let path = dir.path().join("file.json");
    let saved = std::fs::read(&path).unwrap();
    exec(&mut console, "destroy City nonexistent");
    assert_eq!(std::fs::read(&path).unwrap(), saved);
    assert_eq!(console.service().storage().len(), 1);
}
