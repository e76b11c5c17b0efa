//! Built-in functions.
//!
//! Each function takes evaluated arguments and returns a value, `Ok(None)`
//! to leave the call in the output untouched, or an error message. Calls to
//! names not in the table (`url`, `calc`, `translate`, ...) always pass
//! through.

use phf::phf_map;

use crate::eval::operations::compare_numbers;
use crate::types::{Color, Dimension, Value};

pub type Builtin = fn(&[Value]) -> Result<Option<Value>, String>;

static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    // Color definition
    "rgb" => rgb as Builtin,
    "rgba" => rgba as Builtin,
    "hsl" => hsl as Builtin,
    "hsla" => hsla as Builtin,
    // Color operations
    "lighten" => lighten as Builtin,
    "darken" => darken as Builtin,
    "saturate" => saturate as Builtin,
    "desaturate" => desaturate as Builtin,
    "fadein" => fadein as Builtin,
    "fadeout" => fadeout as Builtin,
    "fade" => fade as Builtin,
    "spin" => spin as Builtin,
    "mix" => mix as Builtin,
    "greyscale" => greyscale as Builtin,
    "contrast" => contrast as Builtin,
    // Color channels
    "red" => red as Builtin,
    "green" => green as Builtin,
    "blue" => blue as Builtin,
    "alpha" => alpha as Builtin,
    "hue" => hue as Builtin,
    "saturation" => saturation as Builtin,
    "lightness" => lightness as Builtin,
    // Math
    "percentage" => percentage as Builtin,
    "round" => round as Builtin,
    "ceil" => ceil as Builtin,
    "floor" => floor as Builtin,
    "sqrt" => sqrt as Builtin,
    "abs" => abs as Builtin,
    "min" => min as Builtin,
    "max" => max as Builtin,
    "unit" => unit as Builtin,
    // Strings
    "e" => e as Builtin,
    "escape" => escape as Builtin,
    "%" => format as Builtin,
    // Type tests
    "iscolor" => iscolor as Builtin,
    "isnumber" => isnumber as Builtin,
    "isstring" => isstring as Builtin,
    "iskeyword" => iskeyword as Builtin,
    "isurl" => isurl as Builtin,
    "ispixel" => ispixel as Builtin,
    "isem" => isem as Builtin,
    "ispercentage" => ispercentage as Builtin,
    "isunit" => isunit as Builtin,
};

/// Look up a built-in by name (case-insensitive).
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.get(name.to_ascii_lowercase().as_str()).copied()
}

// ============================================================================
// Argument helpers
// ============================================================================

fn arg(args: &[Value], index: usize) -> Result<&Value, String> {
    args.get(index)
        .ok_or_else(|| format!("expected at least {} arguments", index + 1))
}

fn as_color(value: &Value) -> Option<Color> {
    match value {
        Value::Color(color) => Some(color.clone()),
        Value::Keyword(name) => Color::named(name),
        _ => None,
    }
}

fn color_arg(args: &[Value], index: usize) -> Result<Color, String> {
    let value = arg(args, index)?;
    as_color(value).ok_or_else(|| format!("argument {} must be a color, got {}", index + 1, value))
}

fn number_arg(args: &[Value], index: usize) -> Result<Dimension, String> {
    let value = arg(args, index)?;
    value
        .as_dimension()
        .cloned()
        .ok_or_else(|| format!("argument {} must be a number, got {}", index + 1, value))
}

/// A percentage or unitless amount as a fraction: `10%` and `10` are `0.1`.
fn amount_arg(args: &[Value], index: usize) -> Result<f64, String> {
    Ok(number_arg(args, index)?.value / 100.0)
}

/// A channel-like number: `50%` is `0.5`, unitless values are used as is.
fn fraction(dim: &Dimension) -> f64 {
    if dim.unit == "%" {
        dim.value / 100.0
    } else {
        dim.value
    }
}

fn color(color: Color) -> Result<Option<Value>, String> {
    Ok(Some(Value::Color(color.computed())))
}

fn number(value: f64, unit: &str) -> Result<Option<Value>, String> {
    Ok(Some(Value::number(value, unit)))
}

fn boolean(truth: bool) -> Result<Option<Value>, String> {
    Ok(Some(Value::boolean(truth)))
}

/// Adjust a color in HSL space.
fn adjust_hsl(args: &[Value], f: impl Fn(&mut f64, &mut f64, &mut f64, f64)) -> Result<Option<Value>, String> {
    let base = color_arg(args, 0)?;
    let amount = amount_arg(args, 1)?;
    let (mut h, mut s, mut l) = base.to_hsl();
    f(&mut h, &mut s, &mut l, amount);
    color(Color::from_hsl(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0), base.alpha))
}

// ============================================================================
// Color definition
// ============================================================================

fn channel(dim: &Dimension) -> f64 {
    if dim.unit == "%" {
        dim.value * 2.55
    } else {
        dim.value
    }
}

fn rgb(args: &[Value]) -> Result<Option<Value>, String> {
    let (r, g, b) = (number_arg(args, 0)?, number_arg(args, 1)?, number_arg(args, 2)?);
    color(Color::rgb(channel(&r), channel(&g), channel(&b)))
}

fn rgba(args: &[Value]) -> Result<Option<Value>, String> {
    if args.len() == 2 {
        let mut base = color_arg(args, 0)?;
        base.alpha = fraction(&number_arg(args, 1)?);
        return color(base);
    }
    let (r, g, b) = (number_arg(args, 0)?, number_arg(args, 1)?, number_arg(args, 2)?);
    let a = fraction(&number_arg(args, 3)?);
    color(Color::rgba(channel(&r), channel(&g), channel(&b), a))
}

fn hsl(args: &[Value]) -> Result<Option<Value>, String> {
    let h = number_arg(args, 0)?.value;
    let s = fraction(&number_arg(args, 1)?);
    let l = fraction(&number_arg(args, 2)?);
    color(Color::from_hsl(h, s, l, 1.0))
}

fn hsla(args: &[Value]) -> Result<Option<Value>, String> {
    let h = number_arg(args, 0)?.value;
    let s = fraction(&number_arg(args, 1)?);
    let l = fraction(&number_arg(args, 2)?);
    let a = fraction(&number_arg(args, 3)?);
    color(Color::from_hsl(h, s, l, a))
}

// ============================================================================
// Color operations
// ============================================================================

fn lighten(args: &[Value]) -> Result<Option<Value>, String> {
    adjust_hsl(args, |_, _, l, amount| *l += amount)
}

fn darken(args: &[Value]) -> Result<Option<Value>, String> {
    adjust_hsl(args, |_, _, l, amount| *l -= amount)
}

fn saturate(args: &[Value]) -> Result<Option<Value>, String> {
    adjust_hsl(args, |_, s, _, amount| *s += amount)
}

fn desaturate(args: &[Value]) -> Result<Option<Value>, String> {
    adjust_hsl(args, |_, s, _, amount| *s -= amount)
}

fn fadein(args: &[Value]) -> Result<Option<Value>, String> {
    let mut base = color_arg(args, 0)?;
    base.alpha = (base.alpha + amount_arg(args, 1)?).clamp(0.0, 1.0);
    color(base)
}

fn fadeout(args: &[Value]) -> Result<Option<Value>, String> {
    let mut base = color_arg(args, 0)?;
    base.alpha = (base.alpha - amount_arg(args, 1)?).clamp(0.0, 1.0);
    color(base)
}

fn fade(args: &[Value]) -> Result<Option<Value>, String> {
    let mut base = color_arg(args, 0)?;
    base.alpha = amount_arg(args, 1)?.clamp(0.0, 1.0);
    color(base)
}

fn spin(args: &[Value]) -> Result<Option<Value>, String> {
    let base = color_arg(args, 0)?;
    let degrees = number_arg(args, 1)?.value;
    let (h, s, l) = base.to_hsl();
    color(Color::from_hsl(h + degrees, s, l, base.alpha))
}

fn mix(args: &[Value]) -> Result<Option<Value>, String> {
    let first = color_arg(args, 0)?;
    let second = color_arg(args, 1)?;
    let p = if args.len() > 2 { amount_arg(args, 2)? } else { 0.5 };

    let w = p * 2.0 - 1.0;
    let a = first.alpha - second.alpha;
    let w1 = (if w * a == -1.0 { w } else { (w + a) / (1.0 + w * a) } + 1.0) / 2.0;
    let w2 = 1.0 - w1;

    let mut rgb = [0.0; 3];
    for (i, c) in rgb.iter_mut().enumerate() {
        *c = first.rgb[i] * w1 + second.rgb[i] * w2;
    }
    let alpha = first.alpha * p + second.alpha * (1.0 - p);
    color(Color::rgba(rgb[0], rgb[1], rgb[2], alpha))
}

fn greyscale(args: &[Value]) -> Result<Option<Value>, String> {
    let base = color_arg(args, 0)?;
    let (h, _, l) = base.to_hsl();
    color(Color::from_hsl(h, 0.0, l, base.alpha))
}

fn contrast(args: &[Value]) -> Result<Option<Value>, String> {
    let base = match args.first().and_then(as_color) {
        Some(base) => base,
        None => return Ok(None),
    };
    let dark = match args.get(1) {
        Some(_) => color_arg(args, 1)?,
        None => Color::rgb(0.0, 0.0, 0.0),
    };
    let light = match args.get(2) {
        Some(_) => color_arg(args, 2)?,
        None => Color::rgb(255.0, 255.0, 255.0),
    };
    let threshold = match args.get(3) {
        Some(_) => fraction(&number_arg(args, 3)?),
        None => 0.43,
    };
    let (dark, light) = if dark.luma() > light.luma() {
        (light, dark)
    } else {
        (dark, light)
    };
    color(if base.luma() < threshold { light } else { dark })
}

// ============================================================================
// Color channels
// ============================================================================

fn red(args: &[Value]) -> Result<Option<Value>, String> {
    number(color_arg(args, 0)?.rgb[0], "")
}

fn green(args: &[Value]) -> Result<Option<Value>, String> {
    number(color_arg(args, 0)?.rgb[1], "")
}

fn blue(args: &[Value]) -> Result<Option<Value>, String> {
    number(color_arg(args, 0)?.rgb[2], "")
}

fn alpha(args: &[Value]) -> Result<Option<Value>, String> {
    // `alpha(opacity=50)` is an IE filter, not a channel query.
    match args.first().and_then(as_color) {
        Some(base) => number(base.alpha, ""),
        None => Ok(None),
    }
}

fn hue(args: &[Value]) -> Result<Option<Value>, String> {
    number(color_arg(args, 0)?.to_hsl().0.round(), "")
}

fn saturation(args: &[Value]) -> Result<Option<Value>, String> {
    number((color_arg(args, 0)?.to_hsl().1 * 100.0).round(), "%")
}

fn lightness(args: &[Value]) -> Result<Option<Value>, String> {
    number((color_arg(args, 0)?.to_hsl().2 * 100.0).round(), "%")
}

// ============================================================================
// Math
// ============================================================================

fn percentage(args: &[Value]) -> Result<Option<Value>, String> {
    number(number_arg(args, 0)?.value * 100.0, "%")
}

fn map_number(args: &[Value], f: impl Fn(f64) -> f64) -> Result<Option<Value>, String> {
    let dim = number_arg(args, 0)?;
    number(f(dim.value), &dim.unit)
}

fn round(args: &[Value]) -> Result<Option<Value>, String> {
    let places = match args.get(1) {
        Some(_) => number_arg(args, 1)?.value.max(0.0),
        None => 0.0,
    };
    let factor = 10f64.powi(places as i32);
    map_number(args, |v| (v * factor).round() / factor)
}

fn ceil(args: &[Value]) -> Result<Option<Value>, String> {
    map_number(args, f64::ceil)
}

fn floor(args: &[Value]) -> Result<Option<Value>, String> {
    map_number(args, f64::floor)
}

fn sqrt(args: &[Value]) -> Result<Option<Value>, String> {
    map_number(args, f64::sqrt)
}

fn abs(args: &[Value]) -> Result<Option<Value>, String> {
    map_number(args, f64::abs)
}

fn extreme(args: &[Value], wanted: std::cmp::Ordering) -> Result<Option<Value>, String> {
    let mut best = arg(args, 0)?;
    for candidate in &args[1..] {
        let (Some(a), Some(b)) = (candidate.as_dimension(), best.as_dimension()) else {
            return Err(format!("cannot compare {candidate} and {best}"));
        };
        match compare_numbers(a, b) {
            Some(ordering) if ordering == wanted => best = candidate,
            Some(_) => {}
            None => return Err(format!("incompatible types {} and {}", a.unit, b.unit)),
        }
    }
    Ok(Some(best.clone()))
}

fn min(args: &[Value]) -> Result<Option<Value>, String> {
    extreme(args, std::cmp::Ordering::Less)
}

fn max(args: &[Value]) -> Result<Option<Value>, String> {
    extreme(args, std::cmp::Ordering::Greater)
}

fn unit(args: &[Value]) -> Result<Option<Value>, String> {
    let dim = number_arg(args, 0)?;
    let unit = args.get(1).map(Value::to_unquoted).unwrap_or_default();
    number(dim.value, &unit)
}

// ============================================================================
// Strings
// ============================================================================

fn e(args: &[Value]) -> Result<Option<Value>, String> {
    Ok(Some(Value::escaped(arg(args, 0)?.to_unquoted())))
}

/// Percent-encode the characters that are unsafe in URLs.
fn url_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let unsafe_char = matches!(
            c,
            ' ' | '"' | '%' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}' | '=' | ':' | '#'
                | ';' | '(' | ')'
        );
        if unsafe_char || !c.is_ascii() || c.is_ascii_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(args: &[Value]) -> Result<Option<Value>, String> {
    Ok(Some(Value::escaped(url_escape(&arg(args, 0)?.to_unquoted()))))
}

/// `%("%d/%s", a, b)`: `%s`/`%d`/`%a` insert the argument, uppercase forms
/// URL-escape it.
fn format(args: &[Value]) -> Result<Option<Value>, String> {
    let template = arg(args, 0)?;
    let quote = match template {
        Value::Str { quote, .. } => *quote,
        _ => None,
    };
    let template = template.to_unquoted();
    let mut rest = args[1..].iter();
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(p @ ('s' | 'd' | 'a' | 'S' | 'D' | 'A')) => {
                chars.next();
                let value = rest
                    .next()
                    .ok_or_else(|| "not enough arguments for format string".to_string())?;
                let text = value.to_unquoted();
                if p.is_ascii_uppercase() {
                    out.push_str(&url_escape(&text));
                } else {
                    out.push_str(&text);
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    Ok(Some(Value::Str { value: out, quote }))
}

// ============================================================================
// Type tests
// ============================================================================

fn iscolor(args: &[Value]) -> Result<Option<Value>, String> {
    boolean(as_color(arg(args, 0)?).is_some())
}

fn isnumber(args: &[Value]) -> Result<Option<Value>, String> {
    boolean(arg(args, 0)?.as_dimension().is_some())
}

fn isstring(args: &[Value]) -> Result<Option<Value>, String> {
    boolean(matches!(arg(args, 0)?, Value::Str { .. }))
}

fn iskeyword(args: &[Value]) -> Result<Option<Value>, String> {
    boolean(matches!(arg(args, 0)?, Value::Keyword(k) if Color::named(k).is_none()))
}

fn isurl(args: &[Value]) -> Result<Option<Value>, String> {
    let value = arg(args, 0)?;
    let is_url = match value {
        Value::Url(_) => true,
        Value::Call { name, .. } => name.eq_ignore_ascii_case("url"),
        _ => false,
    };
    boolean(is_url)
}

fn has_unit(args: &[Value], unit: &str) -> Result<Option<Value>, String> {
    boolean(
        arg(args, 0)?
            .as_dimension()
            .is_some_and(|d| d.unit.eq_ignore_ascii_case(unit)),
    )
}

fn ispixel(args: &[Value]) -> Result<Option<Value>, String> {
    has_unit(args, "px")
}

fn isem(args: &[Value]) -> Result<Option<Value>, String> {
    has_unit(args, "em")
}

fn ispercentage(args: &[Value]) -> Result<Option<Value>, String> {
    has_unit(args, "%")
}

fn isunit(args: &[Value]) -> Result<Option<Value>, String> {
    let unit = arg(args, 1)?.to_unquoted();
    has_unit(args, &unit)
}
