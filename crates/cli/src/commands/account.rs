//! Account commands.

use secrecy::SecretString;

use flawless_storefront::Storefront;
use flawless_storefront::services::auth::{FederatedProvider, IdentityProvider, SignUp};

/// Create an account and sign it in.
///
/// # Errors
///
/// Returns an error if the email is taken or the details are invalid.
#[allow(clippy::print_stdout)]
pub async fn signup(
    storefront: &Storefront,
    email: String,
    password: String,
    name: String,
    phone: String,
) -> flawless_storefront::Result<()> {
    let profile = storefront
        .identity()
        .sign_up(SignUp {
            email,
            password: SecretString::from(password),
            display_name: name,
            phone_number: phone,
        })
        .await?;

    println!("Welcome, {}!", profile.display_name.as_deref().unwrap_or("there"));
    Ok(())
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or attempts are throttled.
#[allow(clippy::print_stdout)]
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: String,
) -> flawless_storefront::Result<()> {
    let profile = storefront
        .identity()
        .sign_in(email, &SecretString::from(password))
        .await?;

    println!("Signed in as {}", profile.email);
    Ok(())
}

/// Sign in through a federated provider.
///
/// # Errors
///
/// Returns an error if the provider is unknown or not configured.
#[allow(clippy::print_stdout)]
pub async fn login_with(storefront: &Storefront, provider: &str) -> flawless_storefront::Result<()> {
    let provider: FederatedProvider = provider.parse()?;
    let profile = storefront.identity().sign_in_with_provider(provider).await?;

    println!("Signed in as {}", profile.email);
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the session cannot be cleared.
#[allow(clippy::print_stdout)]
pub async fn logout(storefront: &Storefront) -> flawless_storefront::Result<()> {
    storefront.identity().sign_out().await?;
    println!("Signed out");
    Ok(())
}

/// Print the signed-in customer.
#[allow(clippy::print_stdout)]
pub fn whoami(storefront: &Storefront) {
    match storefront.identity().current_user() {
        Some(user) => {
            println!("{}", user.email);
            if let Some(name) = &user.display_name {
                println!("  name:  {name}");
            }
            if let Some(phone) = &user.phone_number {
                println!("  phone: {phone}");
            }
        }
        None => println!("Not signed in"),
    }
}

/// Request a password reset email.
///
/// # Errors
///
/// Returns an error if no account uses the email.
#[allow(clippy::print_stdout)]
pub async fn reset_password(storefront: &Storefront, email: &str) -> flawless_storefront::Result<()> {
    storefront.identity().send_password_reset(email).await?;
    println!("Password reset email sent to {email}");
    Ok(())
}
