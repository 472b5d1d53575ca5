use formwire::{Page, PageOptions};

const DOCUMENT_FORM_PAGE: &str = r##"
<body>
  <a href="#" id="doc-help" data-bs-toggle="tooltip" title="Upload a scanned copy"></a>
  <form id="document-form" action="/documents/upload/" method="post" class="needs-validation">
    <select id="id_document_type" name="document_type" required>
      <option value="">---------</option>
      <option value="license">Business License</option>
      <option value="tax">Tax Certificate</option>
    </select>
    <input type="file" id="id_document" name="document">
    <span class="file-label">No file chosen</span>
    <button id="upload-btn" type="submit">Upload</button>
  </form>
</body>
"##;

const SIGNATURE_PAGE: &str = r#"
<body>
  <form id="signature-form" action="/signature/save/" method="post">
    <input type="hidden" id="id_signature_image" name="signature_image" value="">
    <canvas id="signature-pad" width="400" height="200"></canvas>
    <button id="clear-signature" type="button">Clear</button>
    <button id="save-signature" type="button">Save Signature</button>
  </form>
</body>
"#;

const BADGE_PAGE: &str = r#"
<body>
  <span class="status-badge" id="badge-a">Approved</span>
  <span class="status-badge" id="badge-b">Pending</span>
</body>
"#;

fn never_pulse() -> PageOptions {
    PageOptions {
        pulse_threshold: 2.0,
        ..PageOptions::default()
    }
}

fn always_pulse() -> PageOptions {
    PageOptions {
        pulse_threshold: -1.0,
        ..PageOptions::default()
    }
}

#[test]
fn page_without_wired_elements_loads_cleanly() -> formwire::Result<()> {
    let page = Page::from_html("<p id='plain'>nothing to wire</p>")?;
    assert_eq!(page.tooltip_count(), 0);
    assert!(page.pending_timers().is_empty());
    assert!(page.submissions().is_empty());
    assert!(page.alerts().is_empty());
    Ok(())
}

#[test]
fn tooltip_initializer_creates_one_controller_per_trigger() -> formwire::Result<()> {
    let page = Page::from_html(
        "<a id='a' data-bs-toggle='tooltip' title='First'></a>\
         <span id='b' data-bs-toggle='tooltip' title='Second'></span>\
         <span id='c'>not a trigger</span>",
    )?;
    assert_eq!(page.tooltip_count(), 2);
    Ok(())
}

#[test]
fn hovering_a_trigger_shows_and_hides_the_bubble() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    assert!(!page.tooltip_shown("#doc-help")?);

    page.hover("#doc-help")?;
    assert!(page.tooltip_shown("#doc-help")?);
    page.assert_text(".tooltip", "Upload a scanned copy")?;

    page.unhover("#doc-help")?;
    assert!(!page.tooltip_shown("#doc-help")?);
    assert_eq!(page.count(".tooltip")?, 0);
    Ok(())
}

#[test]
fn focusing_a_trigger_also_toggles_the_bubble() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    page.focus("#doc-help")?;
    assert!(page.tooltip_shown("#doc-help")?);
    page.blur("#doc-help")?;
    assert!(!page.tooltip_shown("#doc-help")?);
    Ok(())
}

#[test]
fn repeated_hover_never_stacks_bubbles() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    page.hover("#doc-help")?;
    page.hover("#doc-help")?;
    assert_eq!(page.count(".tooltip")?, 1);
    Ok(())
}

#[test]
fn file_selection_mirrors_the_name_into_the_sibling_label() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    page.assert_text(".file-label", "No file chosen")?;

    page.select_file("#id_document", "business-license.pdf")?;
    page.assert_text(".file-label", "business-license.pdf")?;

    // Each change overwrites the previous label.
    page.select_file("#id_document", "tax-certificate.pdf")?;
    page.assert_text(".file-label", "tax-certificate.pdf")?;
    Ok(())
}

#[test]
fn file_input_without_a_sibling_label_is_harmless() -> formwire::Result<()> {
    let mut page = Page::from_html("<div><input type='file' id='id_document'></div>")?;
    page.select_file("#id_document", "anything.pdf")?;
    Ok(())
}

#[test]
fn saving_an_empty_signature_warns_and_submits_nothing() -> formwire::Result<()> {
    let mut page = Page::from_html(SIGNATURE_PAGE)?;
    page.click("#save-signature")?;

    assert_eq!(page.alerts(), ["Please provide a signature first."]);
    page.assert_value("#id_signature_image", "")?;
    assert!(page.submissions().is_empty());

    // Every failed attempt warns again.
    page.click("#save-signature")?;
    assert_eq!(page.alerts().len(), 2);
    Ok(())
}

#[test]
fn saving_a_drawn_signature_fills_the_field_and_submits_once() -> formwire::Result<()> {
    let mut page = Page::from_html(SIGNATURE_PAGE)?;
    page.draw_stroke("#signature-pad", &[(20.0, 30.0), (120.0, 80.0), (180.0, 60.0)])?;
    assert!(!page.signature_is_empty()?);
    assert_eq!(page.signature_stroke_count()?, 1);

    page.click("#save-signature")?;

    let data_url = page.value("#id_signature_image")?;
    assert!(data_url.starts_with("data:image/png;base64,"));
    assert!(data_url.len() > "data:image/png;base64,".len());

    let submissions = page.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.form_id.as_deref(), Some("signature-form"));
    assert_eq!(submission.action, "/signature/save/");
    assert_eq!(submission.method, "post");
    assert!(
        submission
            .fields
            .iter()
            .any(|(name, value)| name == "signature_image" && *value == data_url)
    );
    assert!(page.alerts().is_empty());
    Ok(())
}

#[test]
fn clearing_resets_the_pad_so_save_warns_again() -> formwire::Result<()> {
    let mut page = Page::from_html(SIGNATURE_PAGE)?;
    page.draw_stroke("#signature-pad", &[(10.0, 10.0), (40.0, 40.0)])?;
    page.click("#clear-signature")?;
    assert!(page.signature_is_empty()?);

    page.click("#save-signature")?;
    assert_eq!(page.alerts(), ["Please provide a signature first."]);
    page.assert_value("#id_signature_image", "")?;
    assert!(page.submissions().is_empty());
    Ok(())
}

#[test]
fn clearing_an_already_empty_pad_is_a_no_op() -> formwire::Result<()> {
    let mut page = Page::from_html(SIGNATURE_PAGE)?;
    page.click("#clear-signature")?;
    page.click("#clear-signature")?;
    assert!(page.signature_is_empty()?);
    Ok(())
}

#[test]
fn disabled_save_button_ignores_clicks() -> formwire::Result<()> {
    let html = SIGNATURE_PAGE.replace(
        "<button id=\"save-signature\" type=\"button\">",
        "<button id=\"save-signature\" type=\"button\" disabled>",
    );
    let mut page = Page::from_html(&html)?;
    page.click("#save-signature")?;
    assert!(page.alerts().is_empty());
    Ok(())
}

#[test]
fn invalid_form_submission_is_blocked_and_marked() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    assert!(!page.has_class("#document-form", "was-validated")?);

    // The required document type still holds the empty placeholder value.
    page.click("#upload-btn")?;

    assert!(page.submissions().is_empty());
    page.assert_has_class("#document-form", "was-validated")?;
    Ok(())
}

#[test]
fn valid_form_submission_proceeds_and_is_marked() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    page.select_option("#id_document_type", "license")?;
    page.select_file("#id_document", "license-scan.pdf")?;

    page.click("#upload-btn")?;

    let submissions = page.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.form_id.as_deref(), Some("document-form"));
    assert!(
        submission
            .fields
            .contains(&("document_type".into(), "license".into()))
    );
    assert!(
        submission
            .fields
            .contains(&("document".into(), "license-scan.pdf".into()))
    );
    page.assert_has_class("#document-form", "was-validated")?;
    Ok(())
}

#[test]
fn corrected_form_submits_on_retry() -> formwire::Result<()> {
    let mut page = Page::from_html(DOCUMENT_FORM_PAGE)?;
    page.click("#upload-btn")?;
    assert!(page.submissions().is_empty());

    page.select_option("#id_document_type", "tax")?;
    page.click("#upload-btn")?;
    assert_eq!(page.submissions().len(), 1);
    Ok(())
}

#[test]
fn required_checkbox_gates_a_validated_form() -> formwire::Result<()> {
    let html = r#"
    <form id="terms-form" action="/apply/" method="post" class="needs-validation">
      <input type="checkbox" id="agree" name="agree" required>
      <button id="send" type="submit">Send</button>
    </form>
    "#;
    let mut page = Page::from_html(html)?;

    page.click("#send")?;
    assert!(page.submissions().is_empty());

    page.click("#agree")?;
    page.assert_checked("#agree", true)?;
    page.click("#send")?;
    assert_eq!(page.submissions().len(), 1);
    assert_eq!(page.submissions()[0].fields, [("agree".into(), "on".into())]);
    Ok(())
}

#[test]
fn forms_without_the_validation_marker_submit_unchecked() -> formwire::Result<()> {
    let html = r#"
    <form id="legacy-form" action="/legacy/" method="post">
      <input id="who" name="who" required>
      <button id="go" type="submit">Go</button>
    </form>
    "#;
    let mut page = Page::from_html(html)?;
    page.click("#go")?;
    assert_eq!(page.submissions().len(), 1);
    assert!(!page.has_class("#legacy-form", "was-validated")?);
    Ok(())
}

#[test]
fn animation_end_removes_pulse_from_that_badge_only() -> formwire::Result<()> {
    let html = r#"
    <span class="status-badge pulse" id="badge-a">Approved</span>
    <span class="status-badge pulse" id="badge-b">Pending</span>
    "#;
    let mut page = Page::from_html_with(html, never_pulse())?;

    page.dispatch("#badge-a", "animationend")?;
    assert!(!page.has_class("#badge-a", "pulse")?);
    page.assert_has_class("#badge-b", "pulse")?;

    // A later animation cycle can retrigger and complete again.
    page.dispatch("#badge-a", "animationend")?;
    assert!(!page.has_class("#badge-a", "pulse")?);
    Ok(())
}

#[test]
fn pulse_applies_after_the_fixed_delay_when_the_draw_fires() -> formwire::Result<()> {
    let mut page = Page::from_html_with(BADGE_PAGE, always_pulse())?;
    assert_eq!(page.pending_timers().len(), 2);

    page.advance_time(999)?;
    assert!(!page.has_class("#badge-a", "pulse")?);

    page.advance_time(1)?;
    page.assert_has_class("#badge-a", "pulse")?;
    page.assert_has_class("#badge-b", "pulse")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn pulse_never_schedules_when_the_draw_cannot_exceed_the_cutoff() -> formwire::Result<()> {
    let mut page = Page::from_html_with(BADGE_PAGE, never_pulse())?;
    assert!(page.pending_timers().is_empty());
    page.advance_time(10_000)?;
    assert!(!page.has_class("#badge-a", "pulse")?);
    assert!(!page.has_class("#badge-b", "pulse")?);
    Ok(())
}

#[test]
fn same_seed_schedules_the_same_pulse_draws() -> formwire::Result<()> {
    let options = PageOptions {
        random_seed: 1234,
        ..PageOptions::default()
    };
    let first = Page::from_html_with(BADGE_PAGE, options.clone())?;
    let second = Page::from_html_with(BADGE_PAGE, options)?;
    assert_eq!(first.pending_timers(), second.pending_timers());
    Ok(())
}

#[test]
fn cleared_timers_never_fire() -> formwire::Result<()> {
    let mut page = Page::from_html_with(BADGE_PAGE, always_pulse())?;
    let cleared = page.clear_all_timers();
    assert_eq!(cleared, 2);
    page.flush()?;
    assert!(!page.has_class("#badge-a", "pulse")?);
    Ok(())
}

#[test]
fn trace_log_captures_timer_activity() -> formwire::Result<()> {
    let mut page = Page::from_html_with(BADGE_PAGE, always_pulse())?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.advance_time(1000)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[timer]")));
    Ok(())
}

#[test]
fn take_alerts_drains_the_alert_log() -> formwire::Result<()> {
    let mut page = Page::from_html(SIGNATURE_PAGE)?;
    page.click("#save-signature")?;
    assert_eq!(page.take_alerts().len(), 1);
    assert!(page.alerts().is_empty());
    Ok(())
}
