//! SMTP-Versand via lettre (STARTTLS, async)

use async_trait::async_trait;
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::{BestaetigungsVersand, MailConfig, MailError, MailResult};

/// SMTP-Implementierung des Bestaetigungsversands
pub struct SmtpVersand {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpVersand {
    /// Baut den SMTP-Transport aus der Konfiguration (STARTTLS)
    pub fn neu(config: MailConfig) -> MailResult<Self> {
        let credentials =
            Credentials::new(config.benutzername.clone(), config.passwort.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Smtp(format!("SMTP-Transport fehlgeschlagen: {e}")))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { config, transport })
    }

    /// Baut die Bestaetigungsmail (Text + HTML)
    fn nachricht_bauen(
        &self,
        empfaenger: &str,
        anzeigename: &str,
        link: &str,
    ) -> MailResult<Message> {
        let von = format!("{} <{}>", self.config.absender_name, self.config.absender)
            .parse()
            .map_err(|e| MailError::Adresse(format!("Absender: {e}")))?;

        let an = empfaenger
            .parse()
            .map_err(|e| MailError::Adresse(format!("Empfaenger '{empfaenger}': {e}")))?;

        let text = format!(
            "Hallo {anzeigename},\n\n\
             bitte bestaetige deine E-Mail-Adresse ueber folgenden Link:\n\n\
             {link}\n\n\
             Falls du dich nicht registriert hast, ignoriere diese Mail."
        );
        let html = format!(
            "<p>Hallo {anzeigename},</p>\
             <p>bitte bestaetige deine E-Mail-Adresse:</p>\
             <p><a href=\"{link}\">E-Mail bestaetigen</a></p>\
             <p>Falls du dich nicht registriert hast, ignoriere diese Mail.</p>"
        );

        Message::builder()
            .from(von)
            .to(an)
            .subject("Bitte E-Mail-Adresse bestaetigen")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| MailError::Aufbau(e.to_string()))
    }
}

#[async_trait]
impl BestaetigungsVersand for SmtpVersand {
    async fn bestaetigung_senden(
        &self,
        empfaenger: &str,
        anzeigename: &str,
        basis_url: &str,
        token: &str,
    ) -> MailResult<()> {
        let link = format!("{basis_url}/auth/confirmed_email/{token}");
        debug!(empfaenger = %empfaenger, "Bestaetigungsmail wird gebaut");

        let nachricht = self.nachricht_bauen(empfaenger, anzeigename, &link)?;

        self.transport
            .send(nachricht)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        info!(empfaenger = %empfaenger, "Bestaetigungsmail gesendet");
        Ok(())
    }
}
