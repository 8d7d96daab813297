use shared::{Animal, OptionItem, Sex};
use yew::prelude::*;

use crate::components::form::input_value;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A rebuilt option list: placeholder first, then the entries, plus the
/// value that stays selected
#[derive(Debug, Clone, PartialEq)]
pub struct SelectModel {
    pub options: Vec<SelectOption>,
    pub selected: String,
}

/// Rebuild an option list, keeping `current` selected only if it is still
/// one of the new values; otherwise the placeholder (`""`) is selected.
pub fn populate_options(options: &[OptionItem], placeholder: &str, current: &str) -> SelectModel {
    let mut built = Vec::with_capacity(options.len() + 1);
    built.push(SelectOption {
        value: String::new(),
        label: placeholder.to_string(),
    });
    built.extend(options.iter().map(|o| SelectOption {
        value: o.id.to_string(),
        label: o.label.clone(),
    }));

    SelectModel {
        selected: retain_selection(current, options),
        options: built,
    }
}

pub fn retain_selection(current: &str, options: &[OptionItem]) -> String {
    if !current.is_empty() && options.iter().any(|o| o.id.to_string() == current) {
        current.to_string()
    } else {
        String::new()
    }
}

/// Animals of one sex, sorted by tattoo, labelled by tattoo
pub fn options_by_sex(animals: &[Animal], sex: Sex) -> Vec<OptionItem> {
    let mut matching: Vec<&Animal> = animals.iter().filter(|a| a.sex == sex).collect();
    matching.sort_by(|a, b| a.tattoo.cmp(&b.tattoo));
    matching
        .into_iter()
        .map(|a| OptionItem {
            id: a.animal_id,
            label: a.tattoo.clone(),
        })
        .collect()
}

#[derive(Properties, PartialEq)]
pub struct SelectFieldProps {
    pub name: AttrValue,
    pub model: SelectModel,
    pub onchange: Callback<String>,
    #[prop_or_default]
    pub id: Option<AttrValue>,
}

#[function_component(SelectField)]
pub fn select_field(props: &SelectFieldProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| onchange.emit(input_value(&e)))
    };

    html! {
        <select name={props.name.clone()} id={props.id.clone()} {onchange}>
            {for props.model.options.iter().map(|o| html! {
                <option value={o.value.clone()} selected={o.value == props.model.selected}>
                    {&o.label}
                </option>
            })}
        </select>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AnimalStatus;

    fn item(id: i64, label: &str) -> OptionItem {
        OptionItem {
            id,
            label: label.to_string(),
        }
    }

    fn animal(id: i64, tattoo: &str, sex: Sex) -> Animal {
        Animal {
            animal_id: id,
            tattoo: tattoo.to_string(),
            sex,
            status: AnimalStatus::Breeder,
            breed: None,
            color: None,
            birth_date: None,
            source: None,
            litter_id: None,
            death_date: None,
            death_reason: None,
            notes: None,
        }
    }

    #[test]
    fn test_placeholder_comes_first() {
        let model = populate_options(&[item(4, "Doe A")], "Select breeding…", "");
        assert_eq!(model.options[0].value, "");
        assert_eq!(model.options[0].label, "Select breeding…");
        assert_eq!(model.options[1].value, "4");
        assert_eq!(model.selected, "");
    }

    #[test]
    fn test_previous_selection_kept_when_still_present() {
        let model = populate_options(&[item(3, "a"), item(4, "b")], "Pick", "4");
        assert_eq!(model.selected, "4");
    }

    #[test]
    fn test_previous_selection_dropped_when_gone() {
        let model = populate_options(&[item(3, "a")], "Pick", "4");
        assert_eq!(model.selected, "");
    }

    #[test]
    fn test_options_by_sex_filters_and_sorts_by_tattoo() {
        let animals = vec![
            animal(1, "D2", Sex::F),
            animal(2, "B1", Sex::M),
            animal(3, "A9", Sex::F),
            animal(4, "C3", Sex::F),
        ];

        let does = options_by_sex(&animals, Sex::F);
        let labels: Vec<&str> = does.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["A9", "C3", "D2"]);
        assert_eq!(does[0].id, 3);

        let bucks = options_by_sex(&animals, Sex::M);
        assert_eq!(bucks, vec![item(2, "B1")]);
    }
}
