// Sign-in form with rules set up in code
//
// Run with: FORMWISE_DEBUG=1 cargo run --example sign_in

use formwise::prelude::*;
use formwise::formwise_log::info;

fn field(
    doc: &FormDocument,
    form: ElementId,
    element: Element,
) -> formwise::Result<(ElementId, ElementId)> {
    let group = doc.append(form, Element::new("div").class("group"))?;
    let field = doc.append(group, element)?;
    let message = doc.append(group, Element::new("span").class("message"))?;
    Ok((field, message))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = FormDocument::new();
    let form = doc.append(doc.root(), Element::new("form").class("sign-in-htm"))?;
    let (user, user_message) = field(
        &doc,
        form,
        Element::input("text").id("sign-in-user").name("user"),
    )?;
    let (pass, pass_message) = field(
        &doc,
        form,
        Element::input("password").id("sign-in-pass").name("password"),
    )?;
    let button = doc.append(form, Element::input("submit").class("button").value("Sign In"))?;

    let setup = FormSetup::new(
        FormOptions::new(".sign-in-htm")
            .group_selector(".group")
            .error_message_selector(".message"),
    )
    .rule(is_required("#sign-in-user", Some("Please fill in your username!")))
    .rule(is_required("#sign-in-pass", Some("Please fill in your password!")))
    .rule(min_length("#sign-in-pass", 6, None))
    .on_submit(|record| {
        info!(target: "sign_in", "submitting {}", record.to_json());
    });
    let mut controller = FormController::mount(&doc, setup)?;

    println!("== Leaving both fields empty");
    controller.dispatch(FormEvent::Blur(user))?;
    controller.dispatch(FormEvent::Blur(pass))?;
    println!("user: {:?}", doc.text(user_message).unwrap_or_default());
    println!("password: {:?}", doc.text(pass_message).unwrap_or_default());

    println!("== Typing a short password");
    doc.set_value(user, "ada")?;
    controller.dispatch(FormEvent::Input(user))?;
    doc.set_value(pass, "abc")?;
    controller.dispatch(FormEvent::Input(pass))?;
    if let EventOutcome::Submitted(SubmitOutcome::Invalid(errors)) =
        controller.dispatch(FormEvent::Click(button))?
    {
        print!("blocked:\n{}", errors);
    }

    println!("== Fixing the password");
    doc.set_value(pass, "hunter22")?;
    let outcome = controller.dispatch(FormEvent::Click(button))?;
    println!("outcome: {:?}", outcome);

    Ok(())
}
