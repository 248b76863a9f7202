use std::fmt::Write;

use crate::domain::{EmployeeDraft, Field};
use crate::store::FilteredEntry;
use crate::validation::ValidationErrors;
use crate::view::{EditSession, Notice, NoticeKind, Prompt, RegistrationForm};

pub fn render_form(form: &RegistrationForm) -> String {
    let mut out = String::from("== Employee Registration Form ==\n");
    render_fields(&mut out, &form.draft, &form.errors, &Field::ALL);
    out
}

pub fn render_edit(session: &EditSession) -> String {
    let mut out = format!("== Edit Employee (row key {}) ==\n", session.key);
    let fields: Vec<Field> = Field::ALL.into_iter().filter(|f| *f != Field::Photo).collect();
    render_fields(&mut out, &session.draft, &session.errors, &fields);
    out.push_str("(save | cancel)\n");
    out
}

fn render_fields(out: &mut String, draft: &EmployeeDraft, errors: &ValidationErrors, fields: &[Field]) {
    for field in fields {
        let _ = write!(out, "  {:<16} {}", field.label(), draft.field(*field));
        if let Some(message) = errors.get(*field) {
            let _ = write!(out, "   <- {message}");
        }
        out.push('\n');
    }
}

pub fn render_list(rows: &[FilteredEntry]) -> String {
    let mut out = String::from("== Employees ==\n");
    if rows.is_empty() {
        out.push_str("  (no employees)\n");
        return out;
    }
    let _ = writeln!(
        out,
        "  {:>3}  {:<14} {:<14} {:>3}  {:<13}  {}",
        "#", "Name", "Surname", "Age", "ID Number", "Role"
    );
    for (row, entry) in rows.iter().enumerate() {
        let record = &entry.record;
        let _ = writeln!(
            out,
            "  {:>3}  {:<14} {:<14} {:>3}  {:<13}  {}",
            row + 1,
            record.name,
            record.surname,
            record.age,
            record.id_number,
            record.role
        );
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Success => "[ok]",
        NoticeKind::Error => "[error]",
        NoticeKind::Warning => "[warning]",
    };
    format!("{tag} {}: {}", notice.title, notice.text)
}

pub fn render_prompt(prompt: &Prompt) -> String {
    format!("{} {} {} [y/N]", prompt.title, prompt.text, prompt.confirm_label)
}
