// Sign-up form driven by demos/forms.toml
//
// Run with: cargo run --example sign_up
// Override options with e.g. FORMWISE_INVALID_CLASS=has-error

use formwise::formwise_config::EnvLoader;
use formwise::formwise_log::{info, warn};
use formwise::prelude::*;
use std::path::Path;

struct Page {
    doc: FormDocument,
    user: ElementId,
    pass: ElementId,
    confirmation: ElementId,
    email: ElementId,
    button: ElementId,
}

fn build_page() -> formwise::Result<Page> {
    let doc = FormDocument::new();
    let wrap = doc.append(doc.root(), Element::new("div").class("login-wrap"))?;
    let form = doc.append(wrap, Element::new("form").class("sign-up-htm"))?;

    let mut ids = Vec::new();
    for (id, name, kind) in [
        ("sign-up-user", "user", "text"),
        ("sign-up-pass", "password", "password"),
        ("pass-confirmation", "confirmation", "password"),
        ("email", "email", "text"),
    ] {
        let group = doc.append(form, Element::new("div").class("group"))?;
        ids.push(doc.append(group, Element::input(kind).id(id).name(name))?);
        doc.append(group, Element::new("span").class("message"))?;
    }
    let button = doc.append(form, Element::input("submit").class("button").value("Sign Up"))?;

    Ok(Page {
        doc,
        user: ids[0],
        pass: ids[1],
        confirmation: ids[2],
        email: ids[3],
        button,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = EnvLoader::default();
    env.load_dotenv(None)?;

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/forms.toml");
    let forms = FormsFile::load(&path)?;
    let Some(config) = forms.form(".sign-up-htm") else {
        warn!(target: "sign_up", "no .sign-up-htm form in {}", path.display());
        return Ok(());
    };
    let mut config = config.clone();
    env.apply_overrides(&mut config.options);

    let page = build_page()?;
    let doc = &page.doc;
    let setup = FormSetup::from_config(doc, &config)?.on_submit(|record| {
        info!(target: "sign_up", "account request {}", record.to_json());
    });
    let mut controller = FormController::mount(doc, setup)?;

    doc.set_value(page.user, "ada")?;
    doc.set_value(page.pass, "hunter22")?;
    doc.set_value(page.confirmation, "hunter2")?;
    doc.set_value(page.email, "ada@example")?;

    match controller.dispatch(FormEvent::Click(page.button))? {
        EventOutcome::Submitted(SubmitOutcome::Invalid(errors)) => {
            println!("{}", serde_json::to_string_pretty(&errors.to_json())?);
        }
        other => println!("unexpected: {:?}", other),
    }

    doc.set_value(page.confirmation, "hunter22")?;
    controller.dispatch(FormEvent::Blur(page.confirmation))?;
    doc.set_value(page.email, "ada@example.com")?;
    controller.dispatch(FormEvent::Change(page.email))?;

    let outcome = controller.submit()?;
    println!("delivered: {}", matches!(outcome, SubmitOutcome::Delivered(_)));
    Ok(())
}
