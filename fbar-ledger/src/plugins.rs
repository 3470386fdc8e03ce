use beancount_parser_lima as parser;

/// Plugins whose behaviour is built in, rather than loaded.
#[derive(Clone, Default, Debug)]
pub(crate) struct InternalPlugins {
    // accounts used without an open directive are opened on first use
    pub(crate) auto_accounts: bool,
    // posting costs and prices are added to the price map
    pub(crate) implicit_prices: bool,
}

impl<'a> FromIterator<&'a parser::Plugin<'a>> for InternalPlugins {
    fn from_iter<T: IntoIterator<Item = &'a parser::Plugin<'a>>>(iter: T) -> Self {
        let mut internal_plugins = Self::default();
        for plugin in iter {
            match *plugin.module_name().item() {
                "beancount.plugins.auto_accounts" => {
                    internal_plugins.auto_accounts = true;
                }

                "beancount.plugins.implicit_prices" => {
                    internal_plugins.implicit_prices = true;
                }

                module_name => {
                    tracing::debug!("ignoring plugin {module_name}");
                }
            }
        }
        internal_plugins
    }
}
