use crate::config::Settings;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use rand::Rng;
use std::error::Error;

/// SMTP mailer for credential delivery
pub struct Mailer {
    smtp: SmtpTransport,
    from: String,
}

impl Mailer {
    /// Build a transport from the configured SMTP relay.
    pub fn new(settings: &Settings) -> Result<Self, Box<dyn Error>> {
        let creds = Credentials::new(
            settings.smtp_username.clone(),
            settings.smtp_password.clone(),
        );

        let tls_parameters = TlsParameters::new(settings.smtp_server.clone())?;

        let smtp = SmtpTransport::relay(&settings.smtp_server)?
            .credentials(creds)
            .port(settings.smtp_port)
            .tls(Tls::Wrapper(tls_parameters))
            .build();

        Ok(Mailer {
            smtp,
            from: format!("Timetable Portal <{}>", settings.smtp_username),
        })
    }

    /// Send a newly registered faculty member their login credentials.
    pub fn send_faculty_credentials(
        &self,
        to_email: &str,
        name: &str,
        faculty_code: &str,
        password: &str,
    ) -> Result<(), Box<dyn Error>> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to_email.parse()?)
            .subject("Welcome to the Timetable Portal - Login Credentials")
            .body(format!(
                "Welcome, {name}!\n\n\
                 You have been registered as a faculty member.\n\n\
                 Username/Email: {to_email}\n\
                 Password: {password}\n\
                 Faculty code: {faculty_code}\n\n\
                 Please log in and change your password immediately.",
            ))?;

        self.smtp.send(&email)?;
        Ok(())
    }
}

/// Generate a starter password for a provisioned faculty account.
pub fn generate_password() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();

    (0..10)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_long_enough_and_vary() {
        let first = generate_password();
        let second = generate_password();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        // 58^10 keyspace; a collision here means the generator is broken.
        assert_ne!(first, second);
    }
}
