/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "warehouses",
    aliases: &["w", "wh", "warehouse"],
    description: "Browse warehouses",
  },
  Command {
    name: "rooms",
    aliases: &["room"],
    description: "Browse rooms",
  },
  Command {
    name: "racks",
    aliases: &["rack"],
    description: "Browse racks",
  },
  Command {
    name: "equipment",
    aliases: &["eq", "equip"],
    description: "Browse equipment",
  },
  Command {
    name: "products",
    aliases: &["p", "product", "stock"],
    description: "Browse products",
  },
  Command {
    name: "inbound",
    aliases: &["in", "receiving"],
    description: "Inbound shipments",
  },
  Command {
    name: "outbound",
    aliases: &["out", "shipping"],
    description: "Outbound shipments",
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Browse users",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit stockroom",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input_lower).map(|rank| (cmd, rank)))
    .collect();

  // Stable sort keeps declaration order within a rank
  matches.sort_by_key(|(_, rank)| *rank);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve typed input to a command name, by exact name or alias
pub fn resolve(input: &str) -> Option<&'static str> {
  let input_lower = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input_lower || cmd.aliases.contains(&input_lower.as_str()))
    .map(|cmd| cmd.name)
}

/// Lower is better; None means no match
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}
