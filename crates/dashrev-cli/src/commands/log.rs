use crate::commands::Session;
use crate::error::CliResult;
use crate::output::render_revisions;

/// Print the revision log, optionally following it down to the initial save
pub async fn run(session: &Session, all: bool) -> CliResult<()> {
    let controller = &session.controller;
    controller.reset_from_source().await?;

    if all {
        loop {
            let loaded = controller.revisions().len();
            if !controller.load_more().await? || controller.revisions().len() == loaded {
                break;
            }
        }
    }

    let revisions = controller.revisions();
    if revisions.is_empty() {
        println!("{}", session.style.info("This dashboard has no saved versions"));
        return Ok(());
    }

    print!(
        "{}",
        render_revisions(
            &session.style,
            &revisions,
            controller.document().version,
            |r| session.date_of(r),
        )
    );
    if !controller.is_last_page() {
        println!("{}", session.style.info("Older versions available, use --all to list them"));
    }
    Ok(())
}
