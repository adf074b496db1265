use super::{
    base::Provider, configs::ProviderConfig, groq::GroqProvider, openai::OpenAiProvider,
};
use anyhow::Result;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of providers a chat request can be routed to.
/// The string forms are the wire names accepted from clients.
#[derive(EnumIter, EnumString, Display, AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    Groq,
    OpenAi,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Groq(groq_config) => Ok(Box::new(GroqProvider::new(groq_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{ApiConfig, GroqProviderConfig, OpenAiProviderConfig};
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_type_wire_names() {
        assert_eq!("groq".parse::<ProviderType>().unwrap(), ProviderType::Groq);
        assert_eq!("openai".parse::<ProviderType>().unwrap(), ProviderType::OpenAi);
        assert_eq!(ProviderType::OpenAi.to_string(), "openai");

        let names: Vec<String> = ProviderType::iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["groq", "openai"]);
    }

    #[test]
    fn test_unknown_provider_type() {
        assert!("anthropic".parse::<ProviderType>().is_err());
        assert!("".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_get_provider_binds_model() -> Result<()> {
        let api = ApiConfig::new("http://localhost", "key");

        let provider = get_provider(ProviderConfig::Groq(GroqProviderConfig::from_api(
            &api,
            "llama3-70b-8192",
        )))?;
        assert_eq!(provider.model(), "llama3-70b-8192");

        let provider = get_provider(ProviderConfig::OpenAi(OpenAiProviderConfig::from_api(
            &api,
            "gpt-4o-mini",
        )))?;
        assert_eq!(provider.model(), "gpt-4o-mini");
        Ok(())
    }
}
