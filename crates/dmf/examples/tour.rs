//! Guided tour of the component model across format revisions.
//!
//! Demonstrates direct construction, the builder protocol, the three output
//! formats, and how fatal findings and warnings surface.

use dmf::{
    Builder, Component, Fragment, FormatVersion, OutputFormat, SecurityAttributes,
    SubjectCoverageBuilder, TemporalCoverage, markup, render,
};

fn main() {
    // =========================================================================
    // DIRECT CONSTRUCTION
    // =========================================================================

    println!("=== Direct construction ===");
    let bounds = dmf::BoundingBox::new(26.0, 36.0, 42.0, 48.0, FormatVersion::V4_1)
        .expect("Failed to build bounding box");
    println!("{}", markup(&bounds));

    // Revisions disagree on serialized names; the component carries its own.
    let old = dmf::BoundingBox::new(26.0, 36.0, 42.0, 48.0, FormatVersion::V2_0)
        .expect("Failed to build bounding box");
    println!("{}", markup(&old));

    // =========================================================================
    // BUILDER PROTOCOL
    // =========================================================================

    println!("\n=== Builder protocol ===");
    let mut builder = SubjectCoverageBuilder::default();
    builder.keywords.push(keyword("exploration"));
    builder.keywords.push(keyword("speleology"));
    builder.security.classification = Some("U".to_string());
    builder.security.owner_producers.push("USA".to_string());

    // The same builder commits against any revision it is legal in.
    for version in [FormatVersion::V3_1, FormatVersion::V5_0] {
        let subject = builder
            .commit(version)
            .expect("Failed to commit subject coverage")
            .expect("Builder was not empty");
        println!("{version}: {}", markup(&subject));
    }

    // =========================================================================
    // OUTPUT FORMATS
    // =========================================================================

    println!("\n=== Output formats ===");
    let marking = SecurityAttributes::new(
        Some(dmf::Classification::U),
        vec!["USA".to_string()],
        FormatVersion::V4_1,
    )
    .expect("Failed to build marking");
    let window = TemporalCoverage::new(
        Some("Survey window".to_string()),
        Some("2024-01".to_string()),
        Some("2024-06".to_string()),
        marking,
        FormatVersion::V4_1,
    )
    .expect("Failed to build temporal coverage");

    println!("--- markup ---");
    println!("{}", render(&window, OutputFormat::Markup, ""));
    println!("--- text ---");
    println!("{}", render(&window, OutputFormat::Text, ""));
    println!("--- html ---");
    println!("{}", render(&window, OutputFormat::Html, ""));

    // =========================================================================
    // PARSE AND CANONICALIZE
    // =========================================================================

    println!("\n=== Parse and canonicalize ===");
    let messy = r#"<dmf:temporalCoverage xmlns:dmf="urn:dmf:meta:4">
        <dmf:name>Survey window</dmf:name>
        <dmf:start>2024-01</dmf:start>
        <dmf:end>2024-06</dmf:end>
    </dmf:temporalCoverage>"#;
    let fragment = Fragment::parse(messy).expect("Failed to parse markup");
    let parsed = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1)
        .expect("Failed to validate temporal coverage");
    println!("{}", markup(&parsed));

    // =========================================================================
    // FATAL FINDINGS
    // =========================================================================

    println!("\n=== Fatal findings ===");

    // Keyword marking arrives in 4.1; committing earlier trips the gate.
    let mut early = SubjectCoverageBuilder::default();
    let mut marked = keyword("caves");
    marked.security.classification = Some("U".to_string());
    marked.security.owner_producers.push("USA".to_string());
    early.keywords.push(marked);
    match early.commit(FormatVersion::V3_1) {
        Ok(_) => println!("unexpected success"),
        Err(error) => println!("{error}"),
    }

    // Out-of-range coordinates fail content syntax checks.
    match dmf::BoundingBox::new(26.0, 36.0, 42.0, 95.0, FormatVersion::V4_1) {
        Ok(_) => println!("unexpected success"),
        Err(error) => println!("{error}"),
    }

    // =========================================================================
    // WARNINGS
    // =========================================================================

    println!("\n=== Warnings ===");
    let empty = Fragment::parse(r#"<dmf:language xmlns:dmf="urn:dmf:meta:4"/>"#)
        .expect("Failed to parse markup");
    let language = dmf::Language::from_fragment(&empty, FormatVersion::V4_1)
        .expect("Failed to validate language");
    for warning in language.warnings() {
        println!("{} (locator: {})", warning.text(), warning.locator());
    }
}

fn keyword(value: &str) -> dmf::KeywordBuilder {
    dmf::KeywordBuilder {
        value: Some(value.to_string()),
        ..Default::default()
    }
}
