//! Plays a full game without a screen: every row gets the gate, an optional
//! walk lookup, and a collapse onto whatever column the player guessed.
//!
//! Set `QFIELD_CONFIG_PATH` to a JSON config to override the builtin one and
//! `RUST_LOG=qfield=debug` to watch the engine.

use std::sync::Arc;

use qfield::game::RemoteStatus;
use qfield::remote::LocalWalkService;
use qfield::{FieldError, GameConfig, Session};

#[tokio::main]
async fn main() -> Result<(), FieldError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let mut config = GameConfig::load_from_env();
    config.seed.get_or_insert(42);
    config.remote.enabled = true;

    let mut session = Session::new(config)?.with_service(Arc::new(LocalWalkService));
    println!("Starting: {}", session.state());

    while !session.state().is_over() {
        if session.request_remote() {
            match session.await_remote().await {
                RemoteStatus::Adopted => println!("  walk vector adopted for row {}", session.state().row),
                RemoteStatus::FellBack(err) => println!("  walk lookup failed ({}), keeping local field", err),
                _ => {}
            }
        }

        // Chase the brightest column, as a cautious player would.
        let guess = session.brightest();
        session.set_player_column(guess)?;
        session.apply_gate()?;

        let field: Vec<String> = session.weights().iter().map(|w| format!("{:.3}", w)).collect();
        println!("  field [{}]", field.join(", "));

        let outcome = session.collapse()?;
        println!("{}", outcome);
        println!("  {}", session.state());
    }

    println!("Finished with score {}", session.state().score);
    Ok(())
}
