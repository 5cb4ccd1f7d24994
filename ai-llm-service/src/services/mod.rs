pub mod azure_openai_service;
