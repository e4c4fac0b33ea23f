use super::*;
use crate::status::{NoticeId, NoticeKind};

fn student(name: &str, email: Option<&str>) -> StudentRecord {
    StudentRecord {
        name: name.to_string(),
        department: "Physics".to_string(),
        class: "2B".to_string(),
        email: email.map(str::to_string),
    }
}

fn certificate(student_name: &str, filename: &str) -> CertificateRecord {
    CertificateRecord {
        student_name: student_name.to_string(),
        filename: filename.to_string(),
    }
}

#[test]
fn empty_roster_renders_only_placeholder() {
    let review = render_student_review(&[]);
    assert_eq!(review, ReviewList::Empty);
    assert!(review.blocks().is_empty());
    assert_eq!(review.to_html(), "<p>No students found</p>");
}

#[test]
fn students_are_numbered_in_input_order() {
    let review = render_student_review(&[
        student("Ada", Some("ada@example.com")),
        student("Bo", None),
        student("Cy", Some("")),
    ]);
    let blocks = review.blocks();
    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks.iter().map(|b| b.ordinal).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        blocks.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        vec!["Ada", "Bo", "Cy"]
    );
    assert_eq!(blocks[0].email, "ada@example.com");
    assert_eq!(blocks[1].email, EMAIL_NOT_PROVIDED);
    assert_eq!(blocks[2].email, EMAIL_NOT_PROVIDED);

    let html = review.to_html();
    assert_eq!(html.matches(r#"class="student-item""#).count(), 3);
    assert!(html.contains("<h4>2. Bo</h4>"));
    assert!(!html.contains(NO_STUDENTS_PLACEHOLDER));
}

#[test]
fn review_rendering_is_idempotent() {
    let students = vec![student("Ada", None)];
    assert_eq!(
        render_student_review(&students).to_html(),
        render_student_review(&students).to_html()
    );
}

#[test]
fn review_html_escapes_student_fields() {
    let html = render_student_review(&[student("<script>alert(1)</script>", None)]).to_html();
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn certificate_rows_bind_their_position() {
    let rows = render_certificate_list(&[
        certificate("Ada", "certificate_1_Ada.pdf"),
        certificate("Ada", "certificate_2_Ada.pdf"),
        certificate("Bo", "certificate_3_Bo.pdf"),
    ]);
    assert_eq!(rows.len(), 3);
    for (position, row) in rows.iter().enumerate() {
        assert_eq!(row.index, CertificateIndex(position));
        assert_eq!(
            row.actions(),
            [
                CertificateAction::Preview(CertificateIndex(position)),
                CertificateAction::Download(CertificateIndex(position)),
            ]
        );
    }
}

#[test]
fn certificate_html_uses_data_attributes() {
    let rows = render_certificate_list(&[
        certificate("Ada", "certificate_1_Ada.pdf"),
        certificate("Bo \"B\"", "certificate_2_Bo.pdf"),
    ]);
    let html = certificate_list_html(&rows);
    assert_eq!(html.matches(r#"class="certificate-item""#).count(), 2);
    assert!(html.contains(r#"data-action="preview" data-index="1""#));
    assert!(html.contains(r#"data-action="download" data-index="0""#));
    assert!(html.contains("Bo &quot;B&quot;"));
    assert!(!html.contains("onclick"));
}

#[test]
fn actions_round_trip_through_attributes() {
    let action = CertificateAction::Download(CertificateIndex(7));
    assert_eq!(
        CertificateAction::from_attributes(action.name(), &action.index().to_string()),
        Some(action)
    );
    assert_eq!(CertificateAction::from_attributes("print", "1"), None);
    assert_eq!(CertificateAction::from_attributes("preview", "-1"), None);
}

#[test]
fn sections_wrap_fragments_in_bound_containers() {
    let html = workflow_sections_html(
        &render_student_review(&[]),
        &render_certificate_list(&[certificate("Ada", "a.pdf")]),
    );
    assert!(html.contains(r#"<div id="student-list"><p>No students found</p></div>"#));
    assert!(html.contains(r#"<div id="certificate-list"><div class="certificate-item">"#));
}

#[test]
fn notice_markup_carries_kind_class() {
    let html = notice_html(&Notice {
        id: NoticeId(4),
        kind: NoticeKind::Error,
        text: "Upload failed".to_string(),
    });
    assert_eq!(
        html,
        r#"<div class="message error" data-notice="4">Upload failed</div>"#
    );
}

#[test]
fn status_area_lists_notices_in_order() {
    let notices = vec![
        Notice {
            id: NoticeId(1),
            kind: NoticeKind::Success,
            text: "Files uploaded successfully!".to_string(),
        },
        Notice {
            id: NoticeId(2),
            kind: NoticeKind::Info,
            text: "a < b".to_string(),
        },
    ];
    let html = status_area_html(&notices);
    assert!(html.starts_with(r#"<div id="message-container"><div class="message success""#));
    assert!(html.contains(r#"<div class="message info" data-notice="2">a &lt; b</div>"#));
}
