use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zenject::{Container, Injectable, InjectableMember, Injector, Result};

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

// Two consumers of the same contract.
struct Newsletter {
  sender: Arc<dyn MessageSender>,
}

struct TwoFactor {
  sender: Arc<dyn MessageSender>,
}

impl Injectable for Newsletter {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<dyn MessageSender>("sender")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Newsletter {
      sender: injector.resolve()?,
    })
  }
}

impl Injectable for TwoFactor {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<dyn MessageSender>("sender")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(TwoFactor {
      sender: injector.resolve()?,
    })
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();

  // --- Identifiers ---
  // Bind both implementations under distinct identifiers.
  container
    .bind::<dyn MessageSender>()
    .with_id("email")
    .to::<EmailSender>(|s| s)
    .from_instance(EmailSender)
    .finish()?;
  container
    .bind::<dyn MessageSender>()
    .with_id("sms")
    .to::<SmsSender>(|s| s)
    .from_instance(SmsSender)
    .finish()?;

  let email = container.resolve_id::<dyn MessageSender>("email")?;
  let sms = container.resolve_id::<dyn MessageSender>("sms")?;
  println!("{}", email.send("test@example.com", "Hello from Zenject!"));
  println!("{}", sms.send("+123456789", "Hello from Zenject!"));

  // --- Conditions ---
  // Without identifiers, the consumer decides which sender it gets.
  container
    .bind::<dyn MessageSender>()
    .to::<EmailSender>(|s| s)
    .from_instance(EmailSender)
    .when_injected_into::<Newsletter>()
    .finish()?;
  container
    .bind::<dyn MessageSender>()
    .to::<SmsSender>(|s| s)
    .from_instance(SmsSender)
    .when_injected_into::<TwoFactor>()
    .finish()?;
  container.bind::<Newsletter>().finish()?;
  container.bind::<TwoFactor>().finish()?;

  let newsletter = container.resolve::<Newsletter>()?;
  let two_factor = container.resolve::<TwoFactor>()?;
  let result1 = newsletter.sender.send("reader@example.com", "Issue #42");
  let result2 = two_factor.sender.send("+123456789", "Your code is 1234");
  println!("{}", result1);
  println!("{}", result2);

  assert!(result1.contains("email"));
  assert!(result2.contains("SMS"));
  Ok(())
}
