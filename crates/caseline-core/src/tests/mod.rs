mod case;
mod theme;
