//! Human-readable output for catalogs and definitions

use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use scanrules_core::{Catalog, RepositoryDefinition, RuleMetadata};

/// Table row for catalog listings
#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    rule_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Documented")]
    documented: String,
}

fn render_table(rows: &[RuleRow]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

fn row(rule: &RuleMetadata) -> RuleRow {
    RuleRow {
        id: rule.id.clone(),
        name: truncate(&rule.name, 50),
        rule_type: rule.rule_type.clone(),
        severity: rule.severity.clone(),
        tags: rule.tags.join(", "),
        documented: if rule.description.is_empty() { "no" } else { "yes" }.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

pub fn print_catalog(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("No rules in catalog.");
        return;
    }

    println!("{} rule(s):\n", catalog.len());
    let rows: Vec<RuleRow> = catalog.iter().map(row).collect();
    println!("{}", render_table(&rows));
}

pub fn print_rule(rule: &RuleMetadata) {
    println!();
    println!("Rule:     {}", rule.id);
    println!("Name:     {}", rule.name);
    println!("Type:     {}", rule.rule_type);
    println!("Severity: {}", rule.severity);
    if !rule.tags.is_empty() {
        println!("Tags:     {}", rule.tags.join(", "));
    }

    println!();
    if rule.description.is_empty() {
        println!("(no description)");
    } else {
        println!("Description (HTML):");
        for line in rule.description.lines() {
            println!("  {line}");
        }
    }
}

pub fn print_repository(repository: &RepositoryDefinition) {
    println!(
        "Repository '{}' ({}) for language '{}': {} rule(s)",
        repository.name,
        repository.key,
        repository.language,
        repository.rules.len()
    );

    for rule in &repository.rules {
        println!("  {} [{} / {}] {}", rule.key, rule.rule_type, rule.severity, rule.name);
    }
}
